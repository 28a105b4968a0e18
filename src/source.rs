use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use encoding_rs::EUC_KR;
use tracing::debug;

use crate::error::{RaffleError, Result};

/// Read a local text file, trying UTF-8 first and CP949 (EUC-KR) second.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RaffleError::SourceNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    decode(&bytes).ok_or_else(|| RaffleError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: "not valid UTF-8 or CP949".to_string(),
    })
}

fn decode(bytes: &[u8]) -> Option<String> {
    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => Some(text),
        Err(_) => {
            debug!("UTF-8 decode failed, falling back to CP949");
            EUC_KR
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|cow| cow.into_owned())
        }
    }
}
