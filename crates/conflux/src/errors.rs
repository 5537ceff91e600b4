// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Error types for reconciliation primitives
//!
//! Each concern gets its own `thiserror` enum so callers can match on exactly the
//! failure they care about. [`ConfluxError`] wraps all of them for code that only
//! needs to propagate.

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum ConfluxError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Bitstring(#[from] BitstringError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for crate operations
pub type ConfluxResult<T> = Result<T, ConfluxError>;

/// Prime field errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The zero element has no multiplicative inverse
    #[error("Division by zero: the zero element has no inverse")]
    DivisionByZero,

    /// Fixed-width encoding had the wrong length
    #[error("Field element encoding is {actual} bytes, expected {expected}")]
    InvalidWidth { expected: usize, actual: usize },

    /// Encoded value was not below the modulus
    #[error("Field element encoding is not reduced modulo {modulus}")]
    Unreduced { modulus: String },

    /// Invalid modulus or prime size
    #[error("Invalid modulus: {modulus} - {reason}")]
    InvalidModulus { modulus: String, reason: String },
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Bit key errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitstringError {
    /// Bit index outside `0..bit_len`
    #[error("Bit index {index} out of range for bitstring of length {bit_len}")]
    OutOfRange { index: usize, bit_len: usize },

    /// Too many bits per level to enumerate children
    #[error("Bit quantum {bit_quantum} exceeds the maximum of {max}")]
    QuantumTooLarge { bit_quantum: u32, max: u32 },
}

pub type BitstringResult<T> = Result<T, BitstringError>;

/// Linear system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Fewer columns than rows; the system cannot be reduced
    #[error("Matrix is too narrow to reduce: {columns} columns < {rows} rows")]
    TooNarrow { columns: usize, rows: usize },

    /// Row data does not describe a rectangular matrix
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type MatrixResult<T> = Result<T, MatrixError>;

/// Node record encoding and decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Input ended while reading `field`
    #[error("Unexpected end of input while reading {field}")]
    UnexpectedEnd { field: &'static str },

    /// A count or length was negative or out of range
    #[error("Invalid length {value} for {field}")]
    InvalidLength { field: &'static str, value: i64 },

    /// Leaf flag byte was neither 0 nor 1
    #[error("Invalid leaf flag byte {0:#04x}")]
    InvalidFlag(u8),

    /// Bytes left over after a complete record
    #[error("{0} trailing bytes after node record")]
    TrailingBytes(usize),

    /// Sample value count differs from the configured count
    #[error("Node carries {actual} sample values, expected {expected}")]
    SampleCount { expected: usize, actual: usize },

    /// Internal node children do not match the codec's bit quantum
    #[error("Internal node has {actual} children, expected {expected}")]
    ChildCount { expected: usize, actual: usize },

    /// Internal node children are not the keys derived from the node key
    #[error("Internal node children are not derived from key {key}")]
    ChildKeys { key: String },

    /// Codec parameters cannot describe a prefix tree
    #[error("Bit quantum {0} is outside 1..={max}", max = crate::bitstring::MAX_BIT_QUANTUM)]
    InvalidBitQuantum(u32),

    #[error(transparent)]
    Key(#[from] BitstringError),

    /// Sample value belongs to a different field
    #[error("Sample value modulus does not match the codec modulus")]
    ModulusMismatch,

    /// A field element could not be decoded
    #[error("Invalid field element in {field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: FieldError,
    },
}

pub type WireResult<T> = Result<T, WireError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A parameter is outside its valid range
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// Unrecognised field size name
    #[error("Unknown field size '{0}' (expected one of sks, p128, p160, p256, p512)")]
    UnknownFieldSize(String),

    /// Could not load or merge configuration sources
    #[error("Could not load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create an invalid parameter error with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}
