use std::fmt;
use std::str::FromStr;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use phf::phf_map;
use thiserror::Error;

/// Flat device address.  Signed so that `-1` can keep meaning "unassigned" on the wire.
pub type Addr = i64;

/// Fixed AiM bank structure: 4 bank groups of 4 banks per pseudo-channel.
pub const NUM_BANK_GROUPS: usize = 4;
pub const BANKS_PER_GROUP: usize = 4;
pub const NUM_BANKS: usize = NUM_BANK_GROUPS * BANKS_PER_GROUP;

/// Every operation a request or trace line can carry.  Discriminants are the canonical numeric
/// ids seen by external hosts: 0 = Read, 1 = Write, the device defines all others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum OpKind {
    Read = 0,
    Write = 1,
    // single bank
    MacSbk = 2,
    AfSbk = 3,
    CopyBkgb = 4,
    CopyGbbk = 5,
    // four banks within a bank group
    Mac4bkIntraBg = 6,
    Af4bkIntraBg = 7,
    Ewmul = 8,
    Ewadd = 9,
    // all banks
    MacAbk = 10,
    AfAbk = 11,
    WrAflut = 12,
    WrBk = 13,
    // bank independent
    WrGb = 14,
    WrMac = 15,
    WrBias = 16,
    RdMac = 17,
    RdAf = 18,
}

/// Bank granularity of an operation.  Decides which trace fields are meaningful and how many
/// per-bank requests a record expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankClass {
    /// Ordinary read/write at a flat address.
    Plain,
    /// Device-wide, not tied to a bank.
    Global,
    Single,
    Quad,
    All,
}

impl BankClass {
    /// Numeric class as it appears in requests: -1, 0, 1, 4 or 16.
    pub const fn value(self) -> i32 {
        match self {
            Self::Plain => -1,
            Self::Global => 0,
            Self::Single => 1,
            Self::Quad => 4,
            Self::All => 16,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Plain),
            0 => Some(Self::Global),
            1 => Some(Self::Single),
            4 => Some(Self::Quad),
            16 => Some(Self::All),
            _ => None,
        }
    }

    pub const fn is_compute(self) -> bool {
        !matches!(self, Self::Plain)
    }

    /// Number of concrete requests one trace record of this class turns into.
    pub const fn expansion_len(self) -> usize {
        match self {
            Self::Plain | Self::Global | Self::Single => 1,
            Self::Quad => BANKS_PER_GROUP,
            Self::All => NUM_BANKS,
        }
    }
}

struct OpInfo {
    name: &'static str,
    class: BankClass,
}

// indexed by OpKind discriminant
static OP_INFO: [OpInfo; 19] = [
    OpInfo { name: "Read",             class: BankClass::Plain },
    OpInfo { name: "Write",            class: BankClass::Plain },
    OpInfo { name: "MAC_SBK",          class: BankClass::Single },
    OpInfo { name: "AF_SBK",           class: BankClass::Single },
    OpInfo { name: "COPY_BKGB",        class: BankClass::Single },
    OpInfo { name: "COPY_GBBK",        class: BankClass::Single },
    OpInfo { name: "MAC_4BK_INTRA_BG", class: BankClass::Quad },
    OpInfo { name: "AF_4BK_INTRA_BG",  class: BankClass::Quad },
    OpInfo { name: "EWMUL",            class: BankClass::Quad },
    OpInfo { name: "EWADD",            class: BankClass::Quad },
    OpInfo { name: "MAC_ABK",          class: BankClass::All },
    OpInfo { name: "AF_ABK",           class: BankClass::All },
    OpInfo { name: "WR_AFLUT",         class: BankClass::All },
    OpInfo { name: "WR_BK",            class: BankClass::All },
    OpInfo { name: "WR_GB",            class: BankClass::Global },
    OpInfo { name: "WR_MAC",           class: BankClass::Global },
    OpInfo { name: "WR_BIAS",          class: BankClass::Global },
    OpInfo { name: "RD_MAC",           class: BankClass::Global },
    OpInfo { name: "RD_AF",            class: BankClass::Global },
];

// "R"/"W" are the short forms used in trace files.
static OP_NAMES: phf::Map<&'static str, OpKind> = phf_map! {
    "Read"             => OpKind::Read,
    "R"                => OpKind::Read,
    "Write"            => OpKind::Write,
    "W"                => OpKind::Write,
    "MAC_SBK"          => OpKind::MacSbk,
    "AF_SBK"           => OpKind::AfSbk,
    "COPY_BKGB"        => OpKind::CopyBkgb,
    "COPY_GBBK"        => OpKind::CopyGbbk,
    "MAC_4BK_INTRA_BG" => OpKind::Mac4bkIntraBg,
    "AF_4BK_INTRA_BG"  => OpKind::Af4bkIntraBg,
    "EWMUL"            => OpKind::Ewmul,
    "EWADD"            => OpKind::Ewadd,
    "MAC_ABK"          => OpKind::MacAbk,
    "AF_ABK"           => OpKind::AfAbk,
    "WR_AFLUT"         => OpKind::WrAflut,
    "WR_BK"            => OpKind::WrBk,
    "WR_GB"            => OpKind::WrGb,
    "WR_MAC"           => OpKind::WrMac,
    "WR_BIAS"          => OpKind::WrBias,
    "RD_MAC"           => OpKind::RdMac,
    "RD_AF"            => OpKind::RdAf,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized operation '{0}'")]
pub struct UnknownOperation(pub String);

impl OpKind {
    pub const ALL: [OpKind; 19] = [
        Self::Read,
        Self::Write,
        Self::MacSbk,
        Self::AfSbk,
        Self::CopyBkgb,
        Self::CopyGbbk,
        Self::Mac4bkIntraBg,
        Self::Af4bkIntraBg,
        Self::Ewmul,
        Self::Ewadd,
        Self::MacAbk,
        Self::AfAbk,
        Self::WrAflut,
        Self::WrBk,
        Self::WrGb,
        Self::WrMac,
        Self::WrBias,
        Self::RdMac,
        Self::RdAf,
    ];

    fn info(self) -> &'static OpInfo {
        &OP_INFO[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn bank_class(self) -> BankClass {
        self.info().class
    }

    pub fn is_compute(self) -> bool {
        self.bank_class().is_compute()
    }

    pub fn id(self) -> i32 {
        self.to_i32().unwrap_or(-1)
    }

    pub fn from_id(id: i32) -> Option<Self> {
        <Self as FromPrimitive>::from_i32(id)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        OP_NAMES.get(name).copied()
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OpKind {
    type Err = UnknownOperation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_name(value).ok_or_else(|| UnknownOperation(value.to_string()))
    }
}

/// Resolve an operation token to its kind and bank class.  Class comes from the same table the
/// injection wrapper reads through [`OpKind::bank_class`].
pub fn classify(name: &str) -> Result<(OpKind, BankClass), UnknownOperation> {
    let kind: OpKind = name.parse()?;
    Ok((kind, kind.bank_class()))
}
