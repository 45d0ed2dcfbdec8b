/*!
 * Configuration
 * Run parameters, validation and command-line parsing
 */

use crate::core::limits::{DEFAULT_QUANTUM, LOADING_TIME_PER_PAGE, MIN_PAGES_TO_RUN, PAGE_SIZE};
use crate::core::types::{Size, Tick};
use crate::memory::AllocatorKind;
use crate::sched::Discipline;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors, all rejected before the tick loop starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required flag {0}")]
    MissingFlag(&'static str),

    #[error("flag {0} expects a value")]
    MissingValue(String),

    #[error("unknown flag `{0}`")]
    UnknownFlag(String),

    #[error("unknown scheduling discipline `{0}` (expected ff, rr or cs)")]
    UnknownDiscipline(String),

    #[error("unknown allocator `{0}` (expected u, p, v or cm)")]
    UnknownAllocator(String),

    #[error("`{value}` is not a valid {flag} value")]
    InvalidNumber { flag: &'static str, value: String },

    #[error("memory size must be positive, got {0}")]
    NonPositiveMemory(Size),

    #[error("page size must be positive, got {0}")]
    NonPositivePageSize(Size),

    #[error("memory size {memory} is not a multiple of page size {page}")]
    UnalignedMemory { memory: Size, page: Size },

    #[error("quantum must be positive, got {0}")]
    NonPositiveQuantum(Tick),
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimConfig {
    pub trace_path: Option<PathBuf>,
    pub discipline: Discipline,
    pub allocator: AllocatorKind,
    /// Total simulated memory in bytes; ignored by the unlimited allocator
    pub memory_size: Size,
    pub page_size: Size,
    pub quantum: Tick,
    pub loading_time_per_page: Tick,
    pub min_pages_to_run: Size,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trace_path: None,
            discipline: Discipline::Fcfs,
            allocator: AllocatorKind::Unlimited,
            memory_size: 0,
            page_size: PAGE_SIZE,
            quantum: DEFAULT_QUANTUM,
            loading_time_per_page: LOADING_TIME_PER_PAGE,
            min_pages_to_run: MIN_PAGES_TO_RUN,
        }
    }
}

fn take_value<I: Iterator<Item = String>>(
    args: &mut I,
    flag: &'static str,
) -> Result<String, ConfigError> {
    args.next().ok_or(ConfigError::MissingValue(flag.into()))
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        flag,
        value: value.to_string(),
    })
}

impl SimConfig {
    /// Parse the command line: `-f trace -a ff|rr|cs -m u|p|v|cm [-s bytes]
    /// [-q ticks]`.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut saw_discipline = false;
        let mut saw_allocator = false;
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "-f" => config.trace_path = Some(PathBuf::from(take_value(&mut args, "-f")?)),
                "-a" => {
                    config.discipline = match take_value(&mut args, "-a")?.as_str() {
                        "ff" => Discipline::Fcfs,
                        "rr" => Discipline::RoundRobin,
                        "cs" => Discipline::ShortestRemaining,
                        other => return Err(ConfigError::UnknownDiscipline(other.to_string())),
                    };
                    saw_discipline = true;
                }
                "-m" => {
                    config.allocator = match take_value(&mut args, "-m")?.as_str() {
                        "u" => AllocatorKind::Unlimited,
                        "p" => AllocatorKind::Swapping,
                        "v" => AllocatorKind::VirtualLru,
                        "cm" => AllocatorKind::VirtualLfu,
                        other => return Err(ConfigError::UnknownAllocator(other.to_string())),
                    };
                    saw_allocator = true;
                }
                "-s" => config.memory_size = parse_number("-s", &take_value(&mut args, "-s")?)?,
                "-q" => config.quantum = parse_number("-q", &take_value(&mut args, "-q")?)?,
                other => return Err(ConfigError::UnknownFlag(other.to_string())),
            }
        }

        if config.trace_path.is_none() {
            return Err(ConfigError::MissingFlag("-f"));
        }
        if !saw_discipline {
            return Err(ConfigError::MissingFlag("-a"));
        }
        if !saw_allocator {
            return Err(ConfigError::MissingFlag("-m"));
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject bad parameter combinations before any allocator exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantum <= 0 {
            return Err(ConfigError::NonPositiveQuantum(self.quantum));
        }
        if self.allocator != AllocatorKind::Unlimited {
            if self.page_size <= 0 {
                return Err(ConfigError::NonPositivePageSize(self.page_size));
            }
            if self.memory_size <= 0 {
                return Err(ConfigError::NonPositiveMemory(self.memory_size));
            }
            if self.memory_size % self.page_size != 0 {
                return Err(ConfigError::UnalignedMemory {
                    memory: self.memory_size,
                    page: self.page_size,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split_whitespace().map(String::from)
    }

    #[test]
    fn parses_a_full_command_line() {
        let config = SimConfig::from_args(args("-f trace.txt -a rr -m v -s 1000 -q 7")).unwrap();
        assert_eq!(config.trace_path, Some(PathBuf::from("trace.txt")));
        assert_eq!(config.discipline, Discipline::RoundRobin);
        assert_eq!(config.allocator, AllocatorKind::VirtualLru);
        assert_eq!(config.memory_size, 1000);
        assert_eq!(config.quantum, 7);
    }

    #[test]
    fn unlimited_allocator_needs_no_memory_size() {
        let config = SimConfig::from_args(args("-f t -a ff -m u")).unwrap();
        assert_eq!(config.allocator, AllocatorKind::Unlimited);
        assert_eq!(config.quantum, DEFAULT_QUANTUM);
    }

    #[test]
    fn bounded_allocator_requires_memory_size() {
        let err = SimConfig::from_args(args("-f t -a ff -m p")).unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveMemory(0));
    }

    #[test]
    fn rejects_memory_not_aligned_to_pages() {
        let err = SimConfig::from_args(args("-f t -a ff -m p -s 1001")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnalignedMemory {
                memory: 1001,
                page: PAGE_SIZE,
            }
        );
    }

    #[test]
    fn rejects_unknown_discipline_and_flags() {
        assert_eq!(
            SimConfig::from_args(args("-f t -a nope -m u")).unwrap_err(),
            ConfigError::UnknownDiscipline("nope".into())
        );
        assert_eq!(
            SimConfig::from_args(args("-x")).unwrap_err(),
            ConfigError::UnknownFlag("-x".into())
        );
    }

    #[test]
    fn rejects_missing_required_flags() {
        assert_eq!(
            SimConfig::from_args(args("-a ff -m u")).unwrap_err(),
            ConfigError::MissingFlag("-f")
        );
        assert_eq!(
            SimConfig::from_args(args("-f t -m u")).unwrap_err(),
            ConfigError::MissingFlag("-a")
        );
        assert_eq!(
            SimConfig::from_args(args("-f t -a ff")).unwrap_err(),
            ConfigError::MissingFlag("-m")
        );
    }

    #[test]
    fn rejects_non_numeric_sizes() {
        assert_eq!(
            SimConfig::from_args(args("-f t -a ff -m p -s lots")).unwrap_err(),
            ConfigError::InvalidNumber {
                flag: "-s",
                value: "lots".into(),
            }
        );
    }

    #[test]
    fn rejects_non_positive_quantum() {
        let config = SimConfig {
            quantum: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveQuantum(0)));
    }
}
