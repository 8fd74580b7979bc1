use crate::aim::taxonomy::*;

fn expected_class(kind: OpKind) -> BankClass {
    use OpKind::*;
    match kind {
        Read | Write => BankClass::Plain,
        MacSbk | AfSbk | CopyBkgb | CopyGbbk => BankClass::Single,
        Mac4bkIntraBg | Af4bkIntraBg | Ewmul | Ewadd => BankClass::Quad,
        MacAbk | AfAbk | WrAflut | WrBk => BankClass::All,
        WrGb | WrMac | WrBias | RdMac | RdAf => BankClass::Global,
    }
}

#[test]
fn every_kind_has_its_bank_class() {
    for kind in OpKind::ALL {
        assert_eq!(kind.bank_class(), expected_class(kind), "{}", kind);
    }
}

#[test]
fn classification_is_stable_across_lookups() {
    for kind in OpKind::ALL {
        let first = classify(kind.name()).unwrap();
        let second = classify(kind.name()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, (kind, kind.bank_class()));
    }
}

#[test]
fn name_round_trips_for_every_kind() {
    for kind in OpKind::ALL {
        let name = kind.name();
        let back: OpKind = name.parse().unwrap();
        assert_eq!(back, kind);
        assert_eq!(back.name(), name);
        assert_eq!(back.to_string(), name);
    }
}

#[test]
fn id_round_trips_for_every_kind() {
    for (idx, kind) in OpKind::ALL.into_iter().enumerate() {
        assert_eq!(kind.id(), idx as i32);
        assert_eq!(OpKind::from_id(kind.id()), Some(kind));
    }
    assert_eq!(OpKind::from_id(19), None);
    assert_eq!(OpKind::from_id(-1), None);
}

#[test]
fn unknown_names_are_distinct_from_every_kind() {
    for name in ["FOO", "", "mac_sbk", "MAC_4BK_INTER_BG", "UNKNOWN"] {
        assert_eq!(OpKind::from_name(name), None);
        assert_eq!(classify(name), Err(UnknownOperation(name.to_string())));
    }
}

#[test]
fn trace_short_forms_resolve_to_read_write() {
    assert_eq!(classify("R"), Ok((OpKind::Read, BankClass::Plain)));
    assert_eq!(classify("W"), Ok((OpKind::Write, BankClass::Plain)));
    assert_eq!(OpKind::Read.name(), "Read");
}

#[test]
fn bank_class_values() {
    let classes = [
        (BankClass::Plain, -1, 1),
        (BankClass::Global, 0, 1),
        (BankClass::Single, 1, 1),
        (BankClass::Quad, 4, 4),
        (BankClass::All, 16, 16),
    ];
    for (class, value, len) in classes {
        assert_eq!(class.value(), value);
        assert_eq!(BankClass::from_value(value), Some(class));
        assert_eq!(class.expansion_len(), len);
        assert_eq!(class.is_compute(), value >= 0);
    }
    assert_eq!(BankClass::from_value(2), None);
}
