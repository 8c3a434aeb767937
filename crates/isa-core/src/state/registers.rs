use std::fmt;

use crate::{IsaError, NumericType};

/// Name of the instruction-pointer register every variant carries.
pub const IP_REGISTER: &str = "ip";

/// Observer invoked after every successful register write with
/// `(index, stored_value, register_file)`.
pub type RegisterObserver = Box<dyn FnMut(usize, f64, &RegisterFile)>;

/// Register selector accepted by [`RegisterFile::read`] and
/// [`RegisterFile::write`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegisterRef<'a> {
    /// Register looked up by name.
    Name(&'a str),
    /// Register looked up by index; fractional indices are floored.
    Index(f64),
}

impl fmt::Display for RegisterRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl<'a> From<&'a str> for RegisterRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for RegisterRef<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn from(index: usize) -> Self {
        Self::Index(index as f64)
    }
}

impl From<f64> for RegisterRef<'_> {
    fn from(index: f64) -> Self {
        Self::Index(index)
    }
}

/// Fixed, named, ordered bank of words backed by one contiguous buffer.
///
/// Register `i` occupies `byte_width` bytes at offset `i * byte_width`.
pub struct RegisterFile {
    numeric: NumericType,
    names: Vec<String>,
    storage: Box<[u8]>,
    ip_index: usize,
    observer: Option<RegisterObserver>,
}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterFile")
            .field("numeric", &self.numeric.kind)
            .field("names", &self.names)
            .field("values", &self.snapshot())
            .field("ip_index", &self.ip_index)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl RegisterFile {
    /// Creates a zeroed register file.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidConfiguration`] when `names` contains a
    /// duplicate or lacks the [`IP_REGISTER`].
    pub fn new(numeric: NumericType, names: Vec<String>) -> Result<Self, IsaError> {
        for (position, name) in names.iter().enumerate() {
            if names[..position].contains(name) {
                return Err(IsaError::InvalidConfiguration {
                    reason: format!("duplicate register name '{name}'"),
                });
            }
        }

        let ip_index = names
            .iter()
            .position(|name| name == IP_REGISTER)
            .ok_or_else(|| IsaError::InvalidConfiguration {
                reason: format!("register map lacks the '{IP_REGISTER}' register"),
            })?;

        Ok(Self {
            numeric,
            storage: vec![0; names.len() * numeric.byte_width].into_boxed_slice(),
            names,
            ip_index,
            observer: None,
        })
    }

    /// Numeric type of every register.
    #[must_use]
    pub const fn numeric(&self) -> NumericType {
        self.numeric
    }

    /// Register names in index order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of registers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` when the file holds no registers (never for a valid file).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Cached index of the instruction pointer.
    #[must_use]
    pub const fn ip_index(&self) -> usize {
        self.ip_index
    }

    /// Current instruction pointer value.
    #[must_use]
    pub fn ip(&self) -> f64 {
        self.value_at(self.ip_index)
    }

    /// Index of the register called `name`.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    /// Name of the register at `index`.
    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Resolves a selector to a validated index.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidRegister`] for unknown names and for
    /// indices outside `[0, len)` after flooring.
    pub fn resolve<'a>(&self, register: impl Into<RegisterRef<'a>>) -> Result<usize, IsaError> {
        let register = register.into();
        let index = match register {
            RegisterRef::Name(name) => self.index_of(name),
            RegisterRef::Index(raw) => {
                let floored = raw.floor();
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let index = (floored >= 0.0 && floored < self.names.len() as f64)
                    .then(|| floored as usize);
                index
            }
        };
        index.ok_or_else(|| IsaError::InvalidRegister {
            register: register.to_string(),
        })
    }

    /// Reads one register.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidRegister`] when the selector does not
    /// resolve.
    pub fn read<'a>(&self, register: impl Into<RegisterRef<'a>>) -> Result<f64, IsaError> {
        let index = self.resolve(register)?;
        Ok(self.value_at(index))
    }

    /// Stores `value` re-encoded as the configured numeric type, then
    /// notifies the observer with the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidRegister`] when the selector does not
    /// resolve.
    pub fn write<'a>(
        &mut self,
        register: impl Into<RegisterRef<'a>>,
        value: f64,
    ) -> Result<f64, IsaError> {
        let index = self.resolve(register)?;
        let width = self.numeric.byte_width;
        let slot = &mut self.storage[index * width..(index + 1) * width];
        self.numeric.encode_into(value, slot)?;

        let stored = self.value_at(index);
        if let Some(mut observer) = self.observer.take() {
            observer(index, stored, self);
            self.observer = Some(observer);
        }
        Ok(stored)
    }

    /// Writes the instruction pointer.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::write`] failures.
    pub fn set_ip(&mut self, value: f64) -> Result<f64, IsaError> {
        self.write(self.ip_index, value)
    }

    /// All register values in index order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<f64> {
        (0..self.names.len()).map(|index| self.value_at(index)).collect()
    }

    /// Zeroes every register without notifying the observer.
    pub fn clear(&mut self) {
        self.storage.fill(0);
    }

    /// Installs the write observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: RegisterObserver) {
        self.observer = Some(observer);
    }

    fn value_at(&self, index: usize) -> f64 {
        let width = self.numeric.byte_width;
        self.numeric
            .decode(&self.storage[index * width..(index + 1) * width])
            .unwrap_or(f64::NAN)
    }
}
