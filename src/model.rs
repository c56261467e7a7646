//! Records persisted by the stores.
//!
//! A permit [`Document`] is its identity (`id`, `userId`, timestamps) plus a
//! flat set of [`PermitFields`]. Updates go through [`PermitPatch`], where
//! every field is optional and an absent field is left untouched. Identity
//! fields are not part of the patch, so an update can never move a document
//! to another owner or rewrite its id.
//!
//! All JSON uses camelCase keys, which is the layout already written by the
//! web client:
//!
//! ```rust
//! use anugya_patra_core::model::PermitPatch;
//!
//! let patch: PermitPatch = serde_json::from_str(r#"{"title":"T2","totalWeight":12.5}"#)?;
//! assert_eq!(patch.title.as_deref(), Some("T2"));
//! assert_eq!(patch.total_weight, Some(12.5));
//! assert!(patch.crop_name.is_none());
//! # Ok::<(), serde_json::Error>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identity held by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! permit_fields {
    ($( $(#[$meta:meta])* $field:ident : $ty:ty ),* $(,)?) => {
        /// Everything the permit form collects.
        ///
        /// Missing keys and explicit `null`s deserialize to the default, so
        /// records written by older clients (title/name/address/date/content
        /// only, or `null` where a number input was left blank) still load.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct PermitFields {
            $(
                $(#[$meta])*
                #[serde(deserialize_with = "null_as_default")]
                pub $field: $ty,
            )*
        }

        /// Partial [`PermitFields`]: `None` means "leave unchanged".
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct PermitPatch {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl PermitPatch {
            /// Shallow overwrite of every field present in the patch.
            pub fn apply_to(self, fields: &mut PermitFields) {
                $(
                    if let Some(value) = self.$field {
                        fields.$field = value;
                    }
                )*
            }

            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )*
            }
        }
    };
}

permit_fields! {
    title: String,
    /// अनुज्ञा-पत्र क्रमांक
    permit_number: String,
    crop_name: String,
    vehicle_type: String,
    vehicle_number: String,
    driver_name: String,
    weighing_station: String,
    weighing_slip_number: String,
    mill_quality: String,
    /// Count of bags/pieces.
    crop_quantity_units: f64,
    /// Quintals.
    total_weight: f64,
    owner_name: String,
    license_number: String,
    man_number: String,
    crop_details: String,
    purchase_date: String,
    total_purchase_quantity: f64,
    total_brought_quantity: f64,
    returned_quantity: f64,
    return_reason: String,
    remaining_stock_weight: f64,
    buyer_trader_name: String,
    buyer_man_number: String,
    market_committee: String,
    gst_number: String,
    market_district: String,
    market_place: String,
    issue_date: String,
    issue_time: String,
    print_date: String,
    print_time: String,
    name: String,
    address: String,
    date: String,
    content: String,
}

impl PermitFields {
    /// Blank form with `date` preset to today (`YYYY-MM-DD`), which is how
    /// the create screen starts out.
    pub fn blank_form() -> Self {
        Self {
            date: Utc::now().format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }
}

/// A stored permit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub fields: PermitFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
