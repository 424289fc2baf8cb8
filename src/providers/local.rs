use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};

use tracing::{debug, trace, warn};

use crate::{
    pv::{PvFactory, PvHandle},
    value::{ConversionError, PvKind, PvValue},
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LocalPvError {
    #[error("No PV named '{0}'")]
    NotFound(String),
    #[error("A PV named '{0}' already exists")]
    AlreadyExists(String),
    #[error("PV '{0}' is read-only")]
    ReadOnly(String),
    #[error("Could not convert value for '{0}': {1}")]
    NoConvert(String, ConversionError),
}

#[derive(Debug)]
struct Record {
    name: String,
    value: PvValue,
    read_only: bool,
    /// The last time this value was written
    timestamp: SystemTime,
}

impl Record {
    /// Store a value, converting to the kind the record was created with
    ///
    /// Strings written to a numeric record are parsed.
    fn store(&mut self, value: &PvValue) -> Result<(), LocalPvError> {
        if self.read_only {
            return Err(LocalPvError::ReadOnly(self.name.clone()));
        }
        self.value = value
            .convert_to(self.value.kind())
            .map_err(|e| LocalPvError::NoConvert(self.name.clone(), e))?;
        self.timestamp = SystemTime::now();
        Ok(())
    }
}

/// Outcome of a write to a [`LocalPv`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutStatus {
    /// The write was issued without waiting for completion
    Sent,
    /// The caller asked to wait, and the write has completed
    Completed,
}

/// A table of PVs held in process memory.
///
/// Clones share the same table, so a test or simulation can keep one copy to
/// inspect values while a [`Device`](crate::Device) owns another as its factory.
#[derive(Clone, Default, Debug)]
pub struct LocalPvs {
    pvs: Arc<Mutex<HashMap<String, Arc<Mutex<Record>>>>>,
}

impl LocalPvs {
    pub fn new() -> LocalPvs {
        LocalPvs::default()
    }

    fn register(
        &self,
        name: &str,
        value: PvValue,
        read_only: bool,
    ) -> Result<(), LocalPvError> {
        let mut pvmap = self.pvs.lock().unwrap();
        if pvmap.contains_key(name) {
            return Err(LocalPvError::AlreadyExists(name.to_owned()));
        }
        debug!("Adding local PV {name} = {value}");
        pvmap.insert(
            name.to_owned(),
            Arc::new(Mutex::new(Record {
                name: name.to_owned(),
                value,
                read_only,
                timestamp: SystemTime::now(),
            })),
        );
        Ok(())
    }

    /// Add a writable PV. Its kind is fixed by the initial value.
    pub fn add_pv<T: Into<PvValue>>(
        &self,
        name: &str,
        initial: T,
    ) -> Result<(), LocalPvError> {
        self.register(name, initial.into(), false)
    }

    pub fn add_readonly_pv<T: Into<PvValue>>(
        &self,
        name: &str,
        initial: T,
    ) -> Result<(), LocalPvError> {
        self.register(name, initial.into(), true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pvs.lock().unwrap().contains_key(name)
    }

    /// Read the current value of a PV, bypassing any handle
    pub fn load(&self, name: &str) -> Option<PvValue> {
        let record = self.pvs.lock().unwrap().get(name)?.clone();
        let value = record.lock().unwrap().value.clone();
        Some(value)
    }

    /// When a PV was last written, or created if never written
    pub fn timestamp(&self, name: &str) -> Option<SystemTime> {
        let record = self.pvs.lock().unwrap().get(name)?.clone();
        let timestamp = record.lock().unwrap().timestamp;
        Some(timestamp)
    }
}

impl PvFactory for LocalPvs {
    type Handle = LocalPv;

    fn create_pv(&mut self, pv_name: &str) -> Result<LocalPv, LocalPvError> {
        let record = self
            .pvs
            .lock()
            .unwrap()
            .get(pv_name)
            .cloned()
            .ok_or_else(|| LocalPvError::NotFound(pv_name.to_owned()))?;
        Ok(LocalPv {
            name: pv_name.to_owned(),
            record,
        })
    }
}

/// Handle to a single PV in a [`LocalPvs`] table
#[derive(Clone, Debug)]
pub struct LocalPv {
    name: String,
    record: Arc<Mutex<Record>>,
}

impl LocalPv {
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The kind that values are stored as
    pub fn kind(&self) -> PvKind {
        self.record.lock().unwrap().value.kind()
    }
}

impl PvHandle for LocalPv {
    type Value = PvValue;
    type PutResult = PutStatus;
    type Error = LocalPvError;

    fn get(&self, as_string: bool) -> Result<PvValue, LocalPvError> {
        let value = self.record.lock().unwrap().value.clone();
        trace!("Read {} = {value}", self.name);
        if as_string {
            Ok(PvValue::String(vec![value.to_string()]))
        } else {
            Ok(value)
        }
    }

    /// Writes apply immediately, so `timeout` never expires
    fn put(
        &self,
        value: PvValue,
        wait: bool,
        timeout: Duration,
    ) -> Result<PutStatus, LocalPvError> {
        trace!(
            "Write {} = {value} (wait: {wait}, timeout: {:.1} s)",
            self.name,
            timeout.as_secs_f32()
        );
        if let Err(e) = self.record.lock().unwrap().store(&value) {
            warn!("Rejected write: {e}");
            return Err(e);
        }
        Ok(if wait {
            PutStatus::Completed
        } else {
            PutStatus::Sent
        })
    }
}
