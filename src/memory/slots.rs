//! Variable slots
//!
//! A fixed-size table of named storage locations owned by one execution run.
//! Slots start unset; reading one before its first assignment is a
//! [`Fault::UndefinedVariable`].

use super::value::Value;
use crate::engine::errors::Fault;

/// Slot table, addressed by index
#[derive(Debug, Clone, PartialEq)]
pub struct Slots {
    names: Vec<String>,
    values: Vec<Option<Value>>,
}

impl Slots {
    /// Create a table with one unset slot per name
    pub fn new(names: Vec<String>) -> Self {
        let values = vec![None; names.len()];
        Slots { names, values }
    }

    /// Read a slot
    pub fn get(&self, index: usize) -> Result<&Value, Fault> {
        let len = self.values.len();
        match self.values.get(index) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(Fault::UndefinedVariable {
                name: self.names[index].clone(),
            }),
            None => Err(Fault::SlotOutOfRange { index, len }),
        }
    }

    /// Bind a value to a slot, overwriting any previous value
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), Fault> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(Fault::SlotOutOfRange { index, len })?;
        *slot = Some(value);
        Ok(())
    }

    /// Name of a slot, if the index is in range
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(name, value)` pairs in slot order; unset slots yield `None`
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> Slots {
        Slots::new(vec!["self".to_string(), "f".to_string()])
    }

    #[test]
    fn test_read_before_write() {
        let slots = slots();
        assert_eq!(
            slots.get(1),
            Err(Fault::UndefinedVariable {
                name: "f".to_string()
            })
        );
    }

    #[test]
    fn test_overwrite() {
        let mut slots = slots();
        slots.set(1, Value::Int(72)).unwrap();
        slots.set(1, Value::str("H")).unwrap();
        assert_eq!(slots.get(1), Ok(&Value::str("H")));
    }

    #[test]
    fn test_out_of_range() {
        let mut slots = slots();
        assert_eq!(
            slots.set(5, Value::None),
            Err(Fault::SlotOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(slots.get(2), Err(Fault::SlotOutOfRange { index: 2, len: 2 }));
    }
}
