use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};
use veilc_ast::ValueRange;

/// Fixed ladder of native C# integer representations, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeWidth {
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
}

impl NativeWidth {
    pub const LADDER: [NativeWidth; 8] = [
        NativeWidth::SByte,
        NativeWidth::Byte,
        NativeWidth::Short,
        NativeWidth::UShort,
        NativeWidth::Int,
        NativeWidth::UInt,
        NativeWidth::Long,
        NativeWidth::ULong,
    ];

    /// Bitvectors are unsigned by construction, so their ladder skips the
    /// signed rungs.
    pub const UNSIGNED_LADDER: [NativeWidth; 4] = [
        NativeWidth::Byte,
        NativeWidth::UShort,
        NativeWidth::UInt,
        NativeWidth::ULong,
    ];

    pub fn csharp_name(&self) -> &'static str {
        match self {
            NativeWidth::SByte => "sbyte",
            NativeWidth::Byte => "byte",
            NativeWidth::Short => "short",
            NativeWidth::UShort => "ushort",
            NativeWidth::Int => "int",
            NativeWidth::UInt => "uint",
            NativeWidth::Long => "long",
            NativeWidth::ULong => "ulong",
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            NativeWidth::SByte | NativeWidth::Byte => 8,
            NativeWidth::Short | NativeWidth::UShort => 16,
            NativeWidth::Int | NativeWidth::UInt => 32,
            NativeWidth::Long | NativeWidth::ULong => 64,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            NativeWidth::SByte | NativeWidth::Short | NativeWidth::Int | NativeWidth::Long
        )
    }

    /// Inclusive representable range.
    pub fn bounds(&self) -> (BigInt, BigInt) {
        let bits = self.bits();
        if self.is_signed() {
            let hi = (BigInt::one() << (bits - 1)) - 1;
            let lo = -(BigInt::one() << (bits - 1));
            (lo, hi)
        } else {
            (BigInt::from(0), (BigInt::one() << bits) - 1)
        }
    }
}

/// Representation chosen for a bounded numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeRepr {
    Native(NativeWidth),
    /// Arbitrary precision, `System.Numerics.BigInteger`.
    Big,
}

impl NativeRepr {
    pub fn is_native(&self) -> bool {
        matches!(self, NativeRepr::Native(_))
    }
}

/// Smallest ladder entry covering the statically known range; arbitrary
/// precision when the range is unknown or too wide.
pub fn select_width(range: Option<&ValueRange>) -> NativeRepr {
    select_from(&NativeWidth::LADDER, range)
}

/// Width of a `bv<w>` value, over the unsigned ladder.
pub fn select_bitvector_width(width: u32) -> NativeRepr {
    let range = ValueRange {
        lo: BigInt::from(0),
        hi: (BigInt::one() << width) - 1,
    };
    select_from(&NativeWidth::UNSIGNED_LADDER, Some(&range))
}

fn select_from(ladder: &[NativeWidth], range: Option<&ValueRange>) -> NativeRepr {
    let range = match range {
        Some(r) => r,
        None => return NativeRepr::Big,
    };
    for width in ladder {
        let (lo, hi) = width.bounds();
        if lo <= range.lo && range.hi <= hi {
            return NativeRepr::Native(*width);
        }
    }
    NativeRepr::Big
}
