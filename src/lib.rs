//! Group related EPICS PVs under a shared name prefix.
//!
//! Many PVs in a control system have names made of a common prefix plus a short
//! "attribute", e.g. `13IDC:str:EraseStart` and `13IDC:str:StopAll`. A [`Device`]
//! represents such a group: you read and write by attribute name, and it builds the
//! full PV name, creates a handle for it on first use, and keeps that handle for
//! reuse.
//!
//! The Device does not talk to the network itself. It is handed a [`PvFactory`] that
//! creates [`PvHandle`]s for full PV names, and all connection management, protocol
//! handling and error reporting belong to that factory. Errors from the factory and
//! handles are returned unchanged.
//!
//! This crate includes one factory, [`providers::LocalPvs`], which serves PVs from
//! process memory. It is useful for simulation and tests, or as a template for
//! wrapping a real CA client.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use epicars_device::{Device, PutOptions, PvValue, providers::{LocalPvs, PutStatus}};
//!
//! let pvs = LocalPvs::new();
//! pvs.add_pv("13IDC:str:EraseStart", 0i32).unwrap();
//! pvs.add_pv("13IDC:str:StopAll", 0i32).unwrap();
//! pvs.add_readonly_pv("13IDC:str:ChannelAdvance", "External").unwrap();
//!
//! let mut struck = Device::builder(pvs.clone())
//!     .prefix("13IDC:str:")
//!     .attrs(["ChannelAdvance", "EraseStart", "StopAll"])
//!     .build()
//!     .unwrap();
//!
//! struck.put("EraseStart", 1i32.into()).unwrap();
//! let status = struck
//!     .put_with("StopAll", 1i32.into(), PutOptions::new(true, Duration::from_secs(5)))
//!     .unwrap();
//! assert_eq!(status, PutStatus::Completed);
//! assert_eq!(pvs.load("13IDC:str:StopAll"), Some(PvValue::Long(vec![1])));
//! assert_eq!(
//!     struck.get_as_string("ChannelAdvance").unwrap().to_string(),
//!     "External"
//! );
//! ```
//!
//! ## Environment
//!
//! The defaults used by [`Device::put`] can be set with:
//! - `EPICS_DEVICE_PUT_TIMEOUT`: seconds to allow a waited write, default `10`.
//! - `EPICS_DEVICE_PUT_WAIT`: `yes` to wait for write completion by default.

mod device;
pub mod providers;
pub mod pv;
pub mod utils;
pub mod value;

pub use crate::device::{Device, DeviceBuilder};
pub use crate::pv::{PutOptions, PvError, PvFactory, PvHandle};
pub use crate::value::{ConversionError, PvKind, PvValue};
