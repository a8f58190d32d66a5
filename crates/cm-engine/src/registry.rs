//! Converter trait and the priority-ordered registry of converter probes.

use alloc::boxed::Box;

use cm_ir::{AudioBlock, AudioFormat};
use thiserror::Error;
use tracing::debug;

use crate::error::MixError;
use crate::selector::Decline;

/// Maximum number of probes a registry holds.
pub const MAX_CONVERTERS: usize = 8;

/// Static metadata about a converter.
#[derive(Debug)]
pub struct ConverterInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub capability: &'static str,
    /// Higher values are probed first.
    pub priority: i32,
}

/// A configured audio conversion stage.
pub trait AudioConverter: Send {
    fn info(&self) -> &ConverterInfo;
    fn input_format(&self) -> &AudioFormat;
    fn output_format(&self) -> &AudioFormat;
    /// Whether output blocks reuse the storage of their input.
    fn runs_in_place(&self) -> bool;
    fn process(&mut self, block: AudioBlock) -> Result<AudioBlock, MixError>;
}

/// Builds a converter for a format pair, or explains why it can't.
pub type ProbeFn = fn(&AudioFormat, &AudioFormat) -> Result<Box<dyn AudioConverter>, Decline>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("converter registry is full ({MAX_CONVERTERS} entries)")]
    Full,
    #[error("converter {0:?} is already registered")]
    Duplicate(&'static str),
}

#[derive(Clone, Copy)]
struct Entry {
    info: &'static ConverterInfo,
    probe: ProbeFn,
}

/// Converter probes, kept sorted by descending priority.
///
/// Entries with equal priority keep registration order.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    entries: heapless::Vec<Entry, MAX_CONVERTERS>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every converter this crate provides.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.extend([(&crate::mixer::INFO, crate::mixer::probe as ProbeFn)]);
        registry
    }

    pub fn register(
        &mut self,
        info: &'static ConverterInfo,
        probe: ProbeFn,
    ) -> Result<(), RegistryError> {
        if self.find(info.name).is_some() {
            return Err(RegistryError::Duplicate(info.name));
        }
        let pos = self
            .entries
            .iter()
            .position(|e| e.info.priority < info.priority)
            .unwrap_or(self.entries.len());
        self.entries
            .insert(pos, Entry { info, probe })
            .map_err(|_| RegistryError::Full)
    }

    /// Ask each probe in priority order for a converter; the first one that
    /// accepts the pair wins.
    ///
    /// When every probe declines, the first reason is returned, unless one of
    /// them found the layouts identical.
    pub fn probe(
        &self,
        input: &AudioFormat,
        output: &AudioFormat,
    ) -> Result<Box<dyn AudioConverter>, Decline> {
        let mut declined = None;
        for entry in &self.entries {
            match (entry.probe)(input, output) {
                Ok(converter) => {
                    debug!(converter = entry.info.name, "converter accepted");
                    return Ok(converter);
                }
                Err(reason) => {
                    debug!(converter = entry.info.name, %reason, "converter declined");
                    if declined.is_none() || reason == Decline::IdenticalLayouts {
                        declined = Some(reason);
                    }
                }
            }
        }
        Err(declined.unwrap_or(Decline::NoConverter))
    }

    pub fn find(&self, name: &str) -> Option<&'static ConverterInfo> {
        self.entries
            .iter()
            .map(|e| e.info)
            .find(|info| info.name == name)
    }

    /// Registered converter names, highest priority first.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.info.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<(&'static ConverterInfo, ProbeFn)> for ConverterRegistry {
    /// Registers each probe, skipping duplicates and anything past capacity.
    fn extend<I: IntoIterator<Item = (&'static ConverterInfo, ProbeFn)>>(&mut self, iter: I) {
        for (info, probe) in iter {
            if let Err(err) = self.register(info, probe) {
                debug!(converter = info.name, %err, "skipping converter");
            }
        }
    }
}
