//! A group of PVs addressed by attribute name under a shared prefix

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
};

use tracing::{debug, trace};

use crate::pv::{PutOptions, PutResultOf, PvError, PvFactory, PvHandle, PvValueOf};

/// A collection of related PVs that share a name prefix.
///
/// Each PV is addressed by an "attribute": the part of its name after the prefix.
/// Handles are created through the factory on first use and then reused for the
/// lifetime of the Device, so every full PV name maps to exactly one handle.
///
/// With no prefix, attributes are used verbatim as PV names and the Device acts as a
/// plain cache of handles.
///
/// ```
/// use epicars_device::{Device, PvValue, providers::LocalPvs};
///
/// let pvs = LocalPvs::new();
/// pvs.add_pv("13IDC:str:EraseStart", 0i32).unwrap();
/// pvs.add_pv("13IDC:str:mca1", vec![0i32; 4]).unwrap();
///
/// let mut struck = Device::with_attrs(pvs, Some("13IDC:str:"), ["EraseStart"]).unwrap();
/// struck.put("EraseStart", 1i32.into()).unwrap();
/// assert_eq!(struck.get("mca1").unwrap(), PvValue::Long(vec![0; 4]));
/// ```
pub struct Device<F: PvFactory> {
    prefix: Option<String>,
    factory: F,
    /// Handles, keyed by full PV name
    pvs: HashMap<String, F::Handle>,
    put_options: PutOptions,
}

impl<F: PvFactory> Device<F> {
    /// Create a Device without resolving any PVs up front
    pub fn new(factory: F, prefix: Option<&str>) -> Self {
        Device {
            prefix: prefix.map(str::to_owned),
            factory,
            pvs: HashMap::new(),
            put_options: PutOptions::default(),
        }
    }

    /// Create a Device and immediately resolve a set of attributes.
    ///
    /// Fails with the first error returned by the factory.
    pub fn with_attrs<I, S>(
        factory: F,
        prefix: Option<&str>,
        attrs: I,
    ) -> Result<Self, PvError<F>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut device = Device::new(factory, prefix);
        for attr in attrs {
            device.resolve(attr.as_ref())?;
        }
        Ok(device)
    }

    pub fn builder(factory: F) -> DeviceBuilder<F> {
        DeviceBuilder::new(factory)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The full PV name for an attribute
    pub fn pv_name(&self, attr: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{attr}"),
            None => attr.to_owned(),
        }
    }

    /// Get the handle for an attribute, creating it if this is the first request
    pub fn resolve(&mut self, attr: &str) -> Result<&F::Handle, PvError<F>> {
        let name = self.pv_name(attr);
        let handle = match self.pvs.entry(name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("Creating handle for {}", entry.key());
                let handle = self.factory.create_pv(entry.key())?;
                entry.insert(handle)
            }
        };
        Ok(&*handle)
    }

    /// Write a value to an attribute, using this Device's default [`PutOptions`]
    pub fn put(
        &mut self,
        attr: &str,
        value: PvValueOf<F>,
    ) -> Result<PutResultOf<F>, PvError<F>> {
        let options = self.put_options;
        self.put_with(attr, value, options)
    }

    pub fn put_with(
        &mut self,
        attr: &str,
        value: PvValueOf<F>,
        options: PutOptions,
    ) -> Result<PutResultOf<F>, PvError<F>> {
        trace!("put {attr} with {options:?}");
        self.resolve(attr)?.put(value, options.wait, options.timeout)
    }

    /// Read the value of an attribute
    pub fn get(&mut self, attr: &str) -> Result<PvValueOf<F>, PvError<F>> {
        trace!("get {attr}");
        self.resolve(attr)?.get(false)
    }

    /// Read the value of an attribute, as a string representation
    pub fn get_as_string(&mut self, attr: &str) -> Result<PvValueOf<F>, PvError<F>> {
        trace!("get {attr} as string");
        self.resolve(attr)?.get(true)
    }

    /// Has a handle been created for this attribute?
    pub fn contains(&self, attr: &str) -> bool {
        self.pvs.contains_key(&self.pv_name(attr))
    }

    /// Full names of all PVs that currently have handles, in no particular order
    pub fn pv_names(&self) -> impl Iterator<Item = &str> {
        self.pvs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pvs.is_empty()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The options used by [`Device::put`]
    pub fn put_options(&self) -> PutOptions {
        self.put_options
    }

    pub fn set_put_options(&mut self, options: PutOptions) {
        self.put_options = options;
    }
}

impl<F> fmt::Debug for Device<F>
where
    F: PvFactory + fmt::Debug,
    F::Handle: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("prefix", &self.prefix)
            .field("factory", &self.factory)
            .field("pvs", &self.pvs)
            .field("put_options", &self.put_options)
            .finish()
    }
}

/// Configure and create a [`Device`]
pub struct DeviceBuilder<F: PvFactory> {
    factory: F,
    prefix: Option<String>,
    attrs: Vec<String>,
    put_options: Option<PutOptions>,
}

impl<F: PvFactory> DeviceBuilder<F> {
    pub fn new(factory: F) -> Self {
        DeviceBuilder {
            factory,
            prefix: None,
            attrs: Vec::new(),
            put_options: None,
        }
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_owned());
        self
    }

    /// Attributes to resolve when the Device is built. May be called repeatedly.
    pub fn attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attrs.extend(attrs.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    pub fn put_options(mut self, options: PutOptions) -> Self {
        self.put_options = Some(options);
        self
    }

    pub fn build(self) -> Result<Device<F>, PvError<F>> {
        let mut device = Device::with_attrs(self.factory, self.prefix.as_deref(), &self.attrs)?;
        if let Some(options) = self.put_options {
            device.put_options = options;
        }
        Ok(device)
    }
}

impl<F: PvFactory + fmt::Debug> fmt::Debug for DeviceBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuilder")
            .field("prefix", &self.prefix)
            .field("factory", &self.factory)
            .field("attrs", &self.attrs)
            .field("put_options", &self.put_options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, time::Duration};

    use super::*;
    use crate::providers::LocalPvs;

    #[derive(Debug)]
    struct Named(String);

    impl PvHandle for Named {
        type Value = String;
        type PutResult = bool;
        type Error = String;

        fn get(&self, as_string: bool) -> Result<String, String> {
            Ok(format!("{}:{as_string}", self.0))
        }
        fn put(&self, _value: String, wait: bool, _timeout: Duration) -> Result<bool, String> {
            Ok(wait)
        }
    }

    fn named(name: &str) -> Result<Named, String> {
        Ok(Named(name.to_owned()))
    }

    #[test]
    fn test_pv_name() {
        let device = Device::new(named, Some("13IDC:str:"));
        assert_eq!(device.pv_name("mca1"), "13IDC:str:mca1");
        let device = Device::new(named, None);
        assert_eq!(device.pv_name("13IDC:m1.VAL"), "13IDC:m1.VAL");
        // Empty prefix is kept, not treated as absent
        let device = Device::new(named, Some(""));
        assert_eq!(device.prefix(), Some(""));
        assert_eq!(device.pv_name("X"), "X");
    }

    #[test]
    fn test_resolve_creates_once() {
        let created = Cell::new(0);
        let factory = |name: &str| {
            created.set(created.get() + 1);
            named(name)
        };
        let mut device = Device::new(factory, Some("P:"));
        let first: *const Named = device.resolve("A").unwrap();
        let second: *const Named = device.resolve("A").unwrap();
        assert_eq!(first, second);
        assert_eq!(created.get(), 1);
        assert!(device.contains("A"));
        assert!(!device.contains("B"));
    }

    #[test]
    fn test_factory_error_does_not_cache() {
        let mut device = Device::new(
            |name: &str| -> Result<Named, String> { Err(format!("no {name}")) },
            None,
        );
        assert_eq!(device.get("X").unwrap_err(), "no X");
        assert!(device.is_empty());
    }

    #[test]
    fn test_builder() {
        let options = PutOptions::new(true, Duration::from_secs(2));
        let mut device = Device::builder(named)
            .prefix("P:")
            .attrs(["A", "B"])
            .attrs(vec!["C".to_string()])
            .put_options(options)
            .build()
            .unwrap();
        let mut names: Vec<_> = device.pv_names().collect();
        names.sort();
        assert_eq!(names, ["P:A", "P:B", "P:C"]);
        assert_eq!(device.put_options(), options);
        assert!(device.put("A", "1".into()).unwrap());
        assert_eq!(device.get_as_string("A").unwrap(), "P:A:true");
    }

    #[test]
    fn test_debug_output() {
        let pvs = LocalPvs::new();
        pvs.add_pv("13IDC:str:mca1", vec![0i32; 4]).unwrap();
        let builder = Device::builder(pvs).prefix("13IDC:str:").attrs(["mca1"]);
        let text = format!("{builder:?}");
        assert!(text.starts_with("DeviceBuilder"));
        assert!(text.contains("\"mca1\""));

        let device = builder.build().unwrap();
        let text = format!("{device:?}");
        assert!(text.starts_with("Device {"));
        assert!(text.contains("\"13IDC:str:\""));
        assert!(text.contains("\"13IDC:str:mca1\""));
    }
}
