use crate::native::{select_bitvector_width, select_width, NativeRepr};
use crate::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use veilc_ast::{DeclRegistry, NewtypeId, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum WidthKey {
    Newtype(NewtypeId),
    BitVector(u32),
}

/// One lowering run over one resolved program. Owns the two write-once
/// caches every component consults: the native-width table and the
/// default-value cache. Each key is populated at most once; independent
/// sessions never share state, so tests and parallel runs cannot interfere.
pub struct Session<'a> {
    pub registry: &'a DeclRegistry,
    widths: Mutex<HashMap<WidthKey, NativeRepr>>,
    defaults: Mutex<HashMap<String, String>>,
}

impl<'a> Session<'a> {
    pub fn new(registry: &'a DeclRegistry) -> Self {
        Self {
            registry,
            widths: Mutex::new(HashMap::new()),
            defaults: Mutex::new(HashMap::new()),
        }
    }

    /// Memoized representation of a declared newtype. Every literal, cast,
    /// and arithmetic site must go through here; a second selection with a
    /// different answer would mean silent overflow or needless boxing.
    pub fn newtype_repr(&self, id: NewtypeId) -> NativeRepr {
        self.width_of(WidthKey::Newtype(id), || {
            select_width(self.registry.newtype(id).range.as_ref())
        })
    }

    /// Memoized representation of a `bv<w>` type.
    pub fn bitvector_repr(&self, width: u32) -> NativeRepr {
        self.width_of(WidthKey::BitVector(width), || {
            select_bitvector_width(width)
        })
    }

    /// Representation of any integral-like type.
    pub fn integral_repr(&self, ty: &Type) -> NativeRepr {
        match ty {
            Type::Int | Type::BigOrdinal => NativeRepr::Big,
            Type::BitVector(w) => self.bitvector_repr(*w),
            Type::Newtype(id) => self.newtype_repr(*id),
            _ => NativeRepr::Big,
        }
    }

    fn width_of(&self, key: WidthKey, compute: impl FnOnce() -> NativeRepr) -> NativeRepr {
        if let Some(repr) = self.widths.lock().unwrap().get(&key) {
            return *repr;
        }
        // Computed outside the lock; first insert wins.
        let repr = compute();
        *self.widths.lock().unwrap().entry(key).or_insert(repr)
    }

    /// Compute-once default-value expression for a rendered type. The
    /// computation may recurse into other defaults (function types build the
    /// result type's default), so the lock is never held across it.
    pub fn cached_default(
        &self,
        key: String,
        compute: impl FnOnce() -> Result<String>,
    ) -> Result<String> {
        if let Some(value) = self.defaults.lock().unwrap().get(&key) {
            return Ok(value.clone());
        }
        let value = compute()?;
        Ok(self
            .defaults
            .lock()
            .unwrap()
            .entry(key)
            .or_insert(value)
            .clone())
    }
}
