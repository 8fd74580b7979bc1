use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};

use crate::aim::error::{ConfigError, LineError};
use crate::aim::taxonomy::{classify, Addr, BankClass, OpKind};

/// Bank coordinates of a four-bank or all-bank operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BankSelect {
    pub ch_mask: u16,
    pub rank: u16,
    pub pseudo_channel: u16,
    pub bank_addr_or_mask: u16,
    pub row: u32,
    pub col: u16,
}

/// Positional fields of a trace line.  Which variant is present follows from the bank class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFields {
    Plain { addr: Addr },
    Global { ch_mask: u16 },
    SingleBank { ch_mask: u16, addr: Addr },
    MultiBank(BankSelect),
}

impl TraceFields {
    fn fits(&self, class: BankClass) -> bool {
        matches!(
            (self, class),
            (Self::Plain { .. }, BankClass::Plain)
                | (Self::Global { .. }, BankClass::Global)
                | (Self::SingleBank { .. }, BankClass::Single)
                | (Self::MultiBank(_), BankClass::Quad | BankClass::All)
        )
    }
}

/// One parsed trace line.  Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trace {
    kind: OpKind,
    fields: TraceFields,
}

impl Trace {
    /// Returns None if `fields` has the wrong shape for the bank class of `kind`.
    pub fn new(kind: OpKind, fields: TraceFields) -> Option<Self> {
        fields
            .fits(kind.bank_class())
            .then_some(Self { kind, fields })
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn bank_class(&self) -> BankClass {
        self.kind.bank_class()
    }

    pub fn is_aim(&self) -> bool {
        self.bank_class().is_compute()
    }

    pub fn fields(&self) -> &TraceFields {
        &self.fields
    }

    /// Flat address carried by the line, if its class has one.
    pub fn addr(&self) -> Option<Addr> {
        match self.fields {
            TraceFields::Plain { addr } | TraceFields::SingleBank { addr, .. } => Some(addr),
            _ => None,
        }
    }

    pub fn ch_mask(&self) -> Option<u16> {
        match self.fields {
            TraceFields::Plain { .. } => None,
            TraceFields::Global { ch_mask } | TraceFields::SingleBank { ch_mask, .. } => {
                Some(ch_mask)
            }
            TraceFields::MultiBank(sel) => Some(sel.ch_mask),
        }
    }
}

// Token positions are 1-based; token 1 is the operation.
fn field<T: FromStr>(tokens: &[&str], position: usize, field: &'static str) -> Result<T, LineError> {
    let token = tokens
        .get(position - 1)
        .ok_or(LineError::MissingField { field, position })?;
    token.parse().map_err(|_| LineError::InvalidField {
        field,
        position,
        token: token.to_string(),
    })
}

/// Parse one line of a trace.  Blank lines and `#` comments yield `Ok(None)`.
///
/// ```text
/// R <address>
/// W <address>
/// WR_GB|WR_MAC|WR_BIAS|RD_MAC|RD_AF <channel_mask>
/// MAC_SBK|AF_SBK|COPY_BKGB|COPY_GBBK <channel_mask> _ _ _ _ _ <address>
/// MAC_4BK_INTRA_BG|AF_4BK_INTRA_BG|EWMUL|EWADD <ch_mask> <rank> <pch> <bank> <row> <col>
/// MAC_ABK|AF_ABK|WR_AFLUT|WR_BK <ch_mask> <rank> <pch> <bank_mask> <row> <col>
/// ```
pub fn parse_line(line: &str) -> Result<Option<Trace>, LineError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (kind, class) =
        classify(tokens[0]).map_err(|err| LineError::UnknownOperation(err.0))?;

    let fields = match class {
        BankClass::Plain => TraceFields::Plain {
            addr: field(&tokens, 2, "address")?,
        },
        BankClass::Global => TraceFields::Global {
            ch_mask: field(&tokens, 2, "channel mask")?,
        },
        BankClass::Single => TraceFields::SingleBank {
            ch_mask: field(&tokens, 2, "channel mask")?,
            addr: field(&tokens, 8, "address")?,
        },
        BankClass::Quad | BankClass::All => TraceFields::MultiBank(BankSelect {
            ch_mask: field(&tokens, 2, "channel mask")?,
            rank: field(&tokens, 3, "rank")?,
            pseudo_channel: field(&tokens, 4, "pseudo-channel")?,
            bank_addr_or_mask: field(&tokens, 5, "bank address")?,
            row: field(&tokens, 6, "row")?,
            col: field(&tokens, 7, "column")?,
        }),
    };

    Ok(Some(Trace { kind, fields }))
}

/// Parse a whole trace from `reader`.  `origin` only labels errors.  Stops at the first bad
/// line, so the caller never sees part of a trace.
pub fn parse_trace<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<Trace>, ConfigError> {
    let mut trace = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ConfigError::TraceUnreadable {
            path: origin.to_path_buf(),
            source,
        })?;
        match parse_line(&line) {
            Ok(Some(entry)) => trace.push(entry),
            Ok(None) => {}
            Err(err) => return Err(ConfigError::from_line(origin.to_path_buf(), idx + 1, err)),
        }
    }
    debug!("parsed {} records from {}", trace.len(), origin.display());
    Ok(trace)
}

pub fn load_trace(path: &Path) -> Result<Vec<Trace>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::TraceNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| ConfigError::TraceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Loading trace file {} ...", path.display());
    let trace = parse_trace(BufReader::new(file), path)?;
    info!("Loaded {} lines.", trace.len());
    Ok(trace)
}
