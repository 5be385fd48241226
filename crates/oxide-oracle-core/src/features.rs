//! Capability flags consumed by the ORM.
//!
//! The flags are built once by merging engine overrides onto the base values,
//! field by field. After that they are read-only.

use serde::Serialize;

use crate::naming::MAX_NAME_LENGTH;
use crate::params::LOB_THRESHOLD;

/// Shape of the value returned by an exhausted `fetchmany`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFetchmany {
    /// An empty list.
    List,
    /// An empty tuple.
    Tuple,
}

/// Resolved capability flags.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseFeatures {
    /// What an exhausted `fetchmany` returns.
    pub empty_fetchmany_value: EmptyFetchmany,
    /// Whether datetimes come back as strings that need parsing.
    pub needs_datetime_string_cast: bool,
    /// Whether the ORM must use the engine's own query class.
    pub uses_custom_query_class: bool,
    /// Whether `''` is stored as NULL.
    pub interprets_empty_strings_as_nulls: bool,
    /// Whether `GROUP BY` on the primary key implies the other columns.
    pub allows_group_by_pk: bool,
    /// Whether transactions are available.
    pub supports_transactions: bool,
    /// Whether `INSERT ... RETURNING` yields the new id.
    pub can_return_id_from_insert: bool,
    /// Whether an `UPDATE` may select from the table it updates.
    pub update_can_self_select: bool,
    /// Maximum identifier length, if limited.
    pub max_name_length: Option<usize>,
    /// Text length above which values bind as large objects, if any.
    pub lob_threshold: Option<usize>,
}

/// Engine-specific overrides; `Some` fields replace the base value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureOverrides {
    /// Override for [`DatabaseFeatures::empty_fetchmany_value`].
    pub empty_fetchmany_value: Option<EmptyFetchmany>,
    /// Override for [`DatabaseFeatures::needs_datetime_string_cast`].
    pub needs_datetime_string_cast: Option<bool>,
    /// Override for [`DatabaseFeatures::uses_custom_query_class`].
    pub uses_custom_query_class: Option<bool>,
    /// Override for [`DatabaseFeatures::interprets_empty_strings_as_nulls`].
    pub interprets_empty_strings_as_nulls: Option<bool>,
    /// Override for [`DatabaseFeatures::allows_group_by_pk`].
    pub allows_group_by_pk: Option<bool>,
    /// Override for [`DatabaseFeatures::supports_transactions`].
    pub supports_transactions: Option<bool>,
    /// Override for [`DatabaseFeatures::can_return_id_from_insert`].
    pub can_return_id_from_insert: Option<bool>,
    /// Override for [`DatabaseFeatures::update_can_self_select`].
    pub update_can_self_select: Option<bool>,
    /// Override for [`DatabaseFeatures::max_name_length`].
    pub max_name_length: Option<usize>,
    /// Override for [`DatabaseFeatures::lob_threshold`].
    pub lob_threshold: Option<usize>,
}

impl FeatureOverrides {
    /// Oracle's departures from the base flags.
    #[must_use]
    pub const fn oracle() -> Self {
        Self {
            empty_fetchmany_value: Some(EmptyFetchmany::Tuple),
            needs_datetime_string_cast: Some(false),
            uses_custom_query_class: Some(true),
            interprets_empty_strings_as_nulls: Some(true),
            allows_group_by_pk: None,
            supports_transactions: None,
            can_return_id_from_insert: None,
            update_can_self_select: None,
            max_name_length: Some(MAX_NAME_LENGTH),
            lob_threshold: Some(LOB_THRESHOLD),
        }
    }
}

/// Base flags shared by every engine.
pub type BaseFeatures = DatabaseFeatures;

impl Default for DatabaseFeatures {
    fn default() -> Self {
        Self {
            empty_fetchmany_value: EmptyFetchmany::List,
            needs_datetime_string_cast: true,
            uses_custom_query_class: false,
            interprets_empty_strings_as_nulls: false,
            allows_group_by_pk: false,
            supports_transactions: true,
            can_return_id_from_insert: false,
            update_can_self_select: true,
            max_name_length: None,
            lob_threshold: None,
        }
    }
}

impl DatabaseFeatures {
    /// Applies `overrides` on top of `self`.
    #[must_use]
    pub fn with_overrides(self, overrides: &FeatureOverrides) -> Self {
        Self {
            empty_fetchmany_value: overrides
                .empty_fetchmany_value
                .unwrap_or(self.empty_fetchmany_value),
            needs_datetime_string_cast: overrides
                .needs_datetime_string_cast
                .unwrap_or(self.needs_datetime_string_cast),
            uses_custom_query_class: overrides
                .uses_custom_query_class
                .unwrap_or(self.uses_custom_query_class),
            interprets_empty_strings_as_nulls: overrides
                .interprets_empty_strings_as_nulls
                .unwrap_or(self.interprets_empty_strings_as_nulls),
            allows_group_by_pk: overrides
                .allows_group_by_pk
                .unwrap_or(self.allows_group_by_pk),
            supports_transactions: overrides
                .supports_transactions
                .unwrap_or(self.supports_transactions),
            can_return_id_from_insert: overrides
                .can_return_id_from_insert
                .unwrap_or(self.can_return_id_from_insert),
            update_can_self_select: overrides
                .update_can_self_select
                .unwrap_or(self.update_can_self_select),
            max_name_length: overrides.max_name_length.or(self.max_name_length),
            lob_threshold: overrides.lob_threshold.or(self.lob_threshold),
        }
    }

    /// Oracle flags: the base flags with [`FeatureOverrides::oracle`] applied.
    #[must_use]
    pub fn oracle() -> Self {
        BaseFeatures::default().with_overrides(&FeatureOverrides::oracle())
    }
}
