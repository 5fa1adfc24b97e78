//! Structural fingerprints of extracted facts.
//!
//! Hashes the semantic fields only. Spans are never fed to the hasher, so an
//! edit that shifts code around without changing what it declares keeps the
//! same fingerprint.

use xxhash_rust::xxh3::Xxh3;

use super::facts::{
    BindableFact, ClassFacts, DecoratorFact, ExportFact, FactValue, FileFacts, ImportFact, ImportedName, ObjectFact,
    RegistrationFact,
};

pub struct Fingerprinter {
    hasher: Xxh3,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter {
    pub fn new() -> Self {
        Fingerprinter { hasher: Xxh3::new() }
    }

    pub fn tag(&mut self, tag: u8) {
        self.hasher.update(&[tag]);
    }

    pub fn str(&mut self, value: &str) {
        self.len(value.len());
        self.hasher.update(value.as_bytes());
    }

    pub fn len(&mut self, len: usize) {
        self.hasher.update(&(len as u64).to_le_bytes());
    }

    pub fn bool(&mut self, value: bool) {
        self.tag(value as u8);
    }

    pub fn finish(&self) -> u64 {
        self.hasher.digest()
    }
}

pub trait Fingerprint {
    fn fingerprint(&self, fp: &mut Fingerprinter);
}

pub fn fingerprint_of<T: Fingerprint + ?Sized>(value: &T) -> u64 {
    let mut fp = Fingerprinter::new();
    value.fingerprint(&mut fp);
    fp.finish()
}

impl Fingerprint for str {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.str(self);
    }
}

impl Fingerprint for String {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.str(self);
    }
}

impl<T: Fingerprint> Fingerprint for [T] {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.len(self.len());
        for item in self {
            item.fingerprint(fp);
        }
    }
}

impl<T: Fingerprint> Fingerprint for Vec<T> {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        self.as_slice().fingerprint(fp);
    }
}

impl<T: Fingerprint> Fingerprint for Option<T> {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        match self {
            Some(value) => {
                fp.tag(1);
                value.fingerprint(fp);
            }
            None => fp.tag(0),
        }
    }
}

impl Fingerprint for FactValue {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        match self {
            FactValue::String(s) => {
                fp.tag(1);
                fp.str(s);
            }
            FactValue::Number(n) => {
                fp.tag(2);
                fp.hasher.update(&n.to_bits().to_le_bytes());
            }
            FactValue::Bool(b) => {
                fp.tag(3);
                fp.bool(*b);
            }
            FactValue::Null => fp.tag(4),
            FactValue::Reference(path) => {
                fp.tag(5);
                fp.str(path);
            }
            FactValue::Array(items) => {
                fp.tag(6);
                items.fingerprint(fp);
            }
            FactValue::Object(object) => {
                fp.tag(7);
                object.fingerprint(fp);
            }
            FactValue::Unknown => fp.tag(8),
        }
    }
}

impl Fingerprint for ObjectFact {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.bool(self.open);
        fp.len(self.entries.len());
        for (key, value) in &self.entries {
            fp.str(key);
            value.fingerprint(fp);
        }
    }
}

impl Fingerprint for DecoratorFact {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.str(&self.name);
        self.args.fingerprint(fp);
    }
}

impl Fingerprint for BindableFact {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.str(&self.property);
        self.config.fingerprint(fp);
    }
}

impl Fingerprint for ClassFacts {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.str(&self.name);
        fp.bool(self.exported);
        self.decorators.fingerprint(fp);
        self.bindables.fingerprint(fp);
        self.static_dependencies.fingerprint(fp);
        self.static_au.fingerprint(fp);
    }
}

impl Fingerprint for ImportedName {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.str(&self.imported);
        fp.str(&self.local);
    }
}

impl Fingerprint for ImportFact {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.str(&self.source);
        self.names.fingerprint(fp);
    }
}

impl Fingerprint for ExportFact {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        fp.str(&self.name);
        self.local.fingerprint(fp);
        self.source.fingerprint(fp);
    }
}

impl Fingerprint for RegistrationFact {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        self.args.fingerprint(fp);
    }
}

impl Fingerprint for FileFacts {
    fn fingerprint(&self, fp: &mut Fingerprinter) {
        self.classes.fingerprint(fp);
        self.imports.fingerprint(fp);
        self.exports.fingerprint(fp);
        self.registrations.fingerprint(fp);
    }
}
