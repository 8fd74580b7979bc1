use serde::Deserialize;

use crate::aim::error::ConfigError;
use crate::aim::request::AddrHierarchy;
use crate::aim::taxonomy::{Addr, BankClass, BANKS_PER_GROUP, NUM_BANK_GROUPS};
use crate::aim::trace::{BankSelect, Trace, TraceFields};
use crate::sim::config::Config;

/// Turns a compute trace record into the flat addresses of every bank it touches.
///
/// The returned list must hold exactly `trace.bank_class().expansion_len()` addresses, in a
/// deterministic order for a given record and translator state.
pub trait AddressTranslator {
    fn translate(&self, trace: &Trace) -> Vec<Addr>;
}

/// Device organization used by [`LinearMapper`].  Bank groups and banks are fixed by the AiM
/// bank structure.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct OrgConfig {
    pub channels: u64,
    pub pseudo_channels: u64,
    pub ranks: u64,
    pub rows: u64,
    pub columns: u64,
    pub tx_bytes: u64,
}

impl Config for OrgConfig {}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            channels: 16,
            pseudo_channels: 1,
            ranks: 1,
            rows: 1 << 14,
            columns: 64,
            tx_bytes: 32,
        }
    }
}

/// Flat addresses are non-negative `i64`s.
const MAX_ADDR_BITS: u32 = 63;

fn bits_for(field: &'static str, value: u64) -> Result<u32, ConfigError> {
    if value == 0 || !value.is_power_of_two() {
        return Err(ConfigError::InvalidOrganization { field, value });
    }
    Ok(value.trailing_zeros())
}

#[derive(Debug, Clone, Copy)]
struct Level {
    shift: u32,
    bits: u32,
}

impl Level {
    fn mask(&self) -> u64 {
        (1u64 << self.bits) - 1
    }

    fn put(&self, value: u64) -> u64 {
        (value & self.mask()) << self.shift
    }

    fn get(&self, addr: u64) -> u32 {
        ((addr >> self.shift) & self.mask()) as u32
    }
}

/// Linear bit-packing translator.  Levels from most to least significant: channel,
/// pseudo-channel, rank, bank group, bank, row, column, transaction offset.
#[derive(Debug, Clone)]
pub struct LinearMapper {
    channel: Level,
    pseudo_channel: Level,
    rank: Level,
    bank_group: Level,
    bank: Level,
    row: Level,
    column: Level,
}

impl LinearMapper {
    pub fn new(org: &OrgConfig) -> Result<Self, ConfigError> {
        let widths = [
            bits_for("tx_bytes", org.tx_bytes)?,
            bits_for("columns", org.columns)?,
            bits_for("rows", org.rows)?,
            BANKS_PER_GROUP.trailing_zeros(),
            NUM_BANK_GROUPS.trailing_zeros(),
            bits_for("ranks", org.ranks)?,
            bits_for("pseudo_channels", org.pseudo_channels)?,
            bits_for("channels", org.channels)?,
        ];
        let mut levels = [Level { shift: 0, bits: 0 }; 8];
        let mut shift = 0;
        for (level, bits) in levels.iter_mut().zip(widths) {
            *level = Level { shift, bits };
            shift += bits;
        }
        if shift > MAX_ADDR_BITS {
            return Err(ConfigError::OrganizationTooWide {
                bits: shift,
                max: MAX_ADDR_BITS,
            });
        }
        let [_, column, row, bank, bank_group, rank, pseudo_channel, channel] = levels;
        Ok(Self {
            channel,
            pseudo_channel,
            rank,
            bank_group,
            bank,
            row,
            column,
        })
    }

    /// Pack a hierarchy into a flat address.  Coordinates wider than their level are masked.
    pub fn encode(&self, h: &AddrHierarchy) -> Addr {
        let raw = self.channel.put(h.channel as u64)
            | self.pseudo_channel.put(h.pseudo_channel as u64)
            | self.rank.put(h.rank as u64)
            | self.bank_group.put(h.bank_group as u64)
            | self.bank.put(h.bank as u64)
            | self.row.put(h.row as u64)
            | self.column.put(h.column as u64);
        raw as Addr
    }

    pub fn decode(&self, addr: Addr) -> AddrHierarchy {
        let raw = addr as u64;
        AddrHierarchy {
            channel: self.channel.get(raw),
            pseudo_channel: self.pseudo_channel.get(raw),
            rank: self.rank.get(raw),
            bank_group: self.bank_group.get(raw),
            bank: self.bank.get(raw),
            row: self.row.get(raw),
            column: self.column.get(raw),
        }
    }

    fn bank_addrs(&self, sel: &BankSelect, groups: impl Iterator<Item = u32>) -> Vec<Addr> {
        let base = AddrHierarchy {
            channel: lowest_channel(sel.ch_mask),
            pseudo_channel: sel.pseudo_channel as u32,
            rank: sel.rank as u32,
            row: sel.row,
            column: sel.col as u32,
            ..AddrHierarchy::default()
        };
        groups
            .flat_map(|bank_group| {
                (0..BANKS_PER_GROUP as u32).map(move |bank| AddrHierarchy {
                    bank_group,
                    bank,
                    ..base
                })
            })
            .map(|h| self.encode(&h))
            .collect()
    }
}

fn lowest_channel(ch_mask: u16) -> u32 {
    if ch_mask == 0 {
        0
    } else {
        ch_mask.trailing_zeros()
    }
}

impl AddressTranslator for LinearMapper {
    fn translate(&self, trace: &Trace) -> Vec<Addr> {
        match (trace.fields(), trace.bank_class()) {
            (TraceFields::Plain { addr }, _) | (TraceFields::SingleBank { addr, .. }, _) => {
                vec![*addr]
            }
            (TraceFields::Global { ch_mask }, _) => {
                let h = AddrHierarchy {
                    channel: lowest_channel(*ch_mask),
                    ..AddrHierarchy::default()
                };
                vec![self.encode(&h)]
            }
            (TraceFields::MultiBank(sel), BankClass::Quad) => {
                let group = sel.bank_addr_or_mask as u32 % NUM_BANK_GROUPS as u32;
                self.bank_addrs(sel, std::iter::once(group))
            }
            (TraceFields::MultiBank(sel), _) => self.bank_addrs(sel, 0..NUM_BANK_GROUPS as u32),
        }
    }
}
