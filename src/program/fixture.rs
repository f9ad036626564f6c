//! The `get_credentials` code object
//!
//! Constants, names, slot names and wordcode as extracted from the server,
//! together with the flag the function returns.

use crate::memory::Value;
use crate::program::decode::{decode, CodeObject, DecodeError};
use crate::program::Program;

/// The string `get_credentials` returns
pub const FLAG: &str = "HTB{cr0iss4nts_ch0c0_hmmmm}";

/// `co_code` of `get_credentials` (CPython 3.8 wordcode)
pub const CODE: [u8; 168] = [
    0x64, 0x01, 0x7d, 0x01, 0x64, 0x02, 0x7d, 0x02, 0x64, 0x03, 0x64, 0x00, 0x64, 0x00, 0x64, 0x04,
    0x85, 0x03, 0x19, 0x00, 0x7d, 0x03, 0x64, 0x05, 0x64, 0x00, 0x64, 0x00, 0x64, 0x04, 0x85, 0x03,
    0x19, 0x00, 0x7d, 0x04, 0x64, 0x06, 0x7d, 0x05, 0x64, 0x07, 0x7d, 0x06, 0x64, 0x08, 0x7d, 0x07,
    0x74, 0x00, 0x7c, 0x01, 0x83, 0x01, 0x7c, 0x03, 0x17, 0x00, 0x74, 0x00, 0x64, 0x09, 0x83, 0x01,
    0x17, 0x00, 0x7c, 0x04, 0x17, 0x00, 0x7c, 0x07, 0x17, 0x00, 0x7c, 0x02, 0xa0, 0x01, 0x64, 0x0a,
    0x64, 0x0b, 0xa1, 0x02, 0x17, 0x00, 0x7c, 0x06, 0x64, 0x00, 0x64, 0x00, 0x64, 0x04, 0x85, 0x03,
    0x19, 0x00, 0x17, 0x00, 0x64, 0x0c, 0x17, 0x00, 0x74, 0x00, 0x7c, 0x05, 0x83, 0x01, 0x64, 0x0d,
    0x14, 0x00, 0x17, 0x00, 0x74, 0x00, 0x64, 0x0e, 0x83, 0x01, 0x17, 0x00, 0x7d, 0x01, 0x64, 0x0f,
    0x64, 0x10, 0x64, 0x11, 0x64, 0x12, 0x9c, 0x03, 0x7d, 0x08, 0x7c, 0x08, 0x44, 0x00, 0x5d, 0x14,
    0x7d, 0x09, 0x7c, 0x01, 0xa0, 0x01, 0x7c, 0x09, 0x7c, 0x08, 0x7c, 0x09, 0x19, 0x00, 0xa1, 0x02,
    0x7d, 0x01, 0x71, 0x8e, 0x7c, 0x01, 0x53, 0x00,
];

/// `co_consts` of `get_credentials`
pub fn consts() -> Vec<Value> {
    let keys = Value::Tuple(vec!["o".into(), "l".into(), "a".into()]);
    vec![
        Value::None,
        Value::Int(72),
        "apts_c".into(),
        "BT".into(),
        Value::Int(-1),
        "orc".into(),
        Value::Int(109),
        "ocoh".into(),
        "iss".into(),
        Value::Int(123),
        "p".into(),
        "n".into(),
        "_h".into(),
        Value::Int(4),
        Value::Int(125),
        "0".into(),
        "1".into(),
        "4".into(),
        keys,
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The full code object
pub fn credentials() -> CodeObject {
    CodeObject {
        consts: consts(),
        names: strings(&["chr", "replace"]),
        varnames: strings(&["self", "f", "a", "blue", "c", "m", "h", "i", "d", "x"]),
        code: CODE.to_vec(),
    }
}

/// The decoded program
pub fn credentials_program() -> Result<Program, DecodeError> {
    decode(&credentials())
}
