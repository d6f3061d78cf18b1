//! Parameters of the [`crate::tree::NodeTable`].

use anyhow::ensure;

/// Size and load factor threshold of the node table.
///
/// The capacity is fixed for the lifetime of the table: it is not resized when
/// the threshold is crossed, the table only reports that it is under pressure
/// through [`crate::tree::NodeTable::has_enough_size`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of slots. Has to be a power of two so that the slot index is
    /// computed with a single mask.
    pub capacity: usize,
    /// Numerator of the fraction of slots that can be used before the table
    /// reports pressure.
    pub limit_numerator: usize,
    /// Denominator of the same fraction.
    pub limit_denominator: usize,
}

impl TableConfig {
    /// Default number of slots. Should be at least ten times the number of
    /// simulations performed per move.
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Creates a configuration with the default 90% threshold.
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            limit_numerator: 9,
            limit_denominator: 10,
        }
    }

    /// Checks that the table can be built with these parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity is zero or not a power of two, or if
    /// the threshold is not a fraction in `(0, 1]`.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.capacity.is_power_of_two(),
            "capacity should be a power of two, got {}",
            self.capacity
        );
        ensure!(
            self.limit_denominator != 0,
            "threshold denominator should be positive"
        );
        ensure!(
            self.limit_numerator != 0 && self.limit_numerator <= self.limit_denominator,
            "threshold should be in (0, 1], got {}/{}",
            self.limit_numerator,
            self.limit_denominator
        );
        Ok(())
    }

    /// Number of used slots above which the table reports pressure.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.capacity / self.limit_denominator * self.limit_numerator
            + self.capacity % self.limit_denominator * self.limit_numerator
                / self.limit_denominator
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}
