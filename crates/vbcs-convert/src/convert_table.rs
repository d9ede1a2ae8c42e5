//! Narrowing-cast helper lookup.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use vbcs_semantic::Ty;

/// Conversion helpers keyed by target type, one name per return type.
/// The date keyword cast never reaches this table (it renders as a native
/// cast), and the base64 string overload is deliberately absent.
static CONVERT_FUNCTIONS: Lazy<FxHashMap<Ty, &'static str>> = Lazy::new(|| {
    [
        (Ty::Boolean, "System.Convert.ToBoolean"),
        (Ty::Byte, "System.Convert.ToByte"),
        (Ty::SByte, "System.Convert.ToSByte"),
        (Ty::Char, "System.Convert.ToChar"),
        (Ty::Int16, "System.Convert.ToInt16"),
        (Ty::UInt16, "System.Convert.ToUInt16"),
        (Ty::Int32, "System.Convert.ToInt32"),
        (Ty::UInt32, "System.Convert.ToUInt32"),
        (Ty::Int64, "System.Convert.ToInt64"),
        (Ty::UInt64, "System.Convert.ToUInt64"),
        (Ty::Single, "System.Convert.ToSingle"),
        (Ty::Double, "System.Convert.ToDouble"),
        (Ty::Decimal, "System.Convert.ToDecimal"),
        (Ty::String, "System.Convert.ToString"),
        (Ty::DateTime, "System.Convert.ToDateTime"),
    ]
    .into_iter()
    .collect()
});

/// The qualified helper name for a cast to `target`, when one exists.
pub fn conversion_function(target: &Ty) -> Option<&'static str> {
    CONVERT_FUNCTIONS.get(target).copied()
}
