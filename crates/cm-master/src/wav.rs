//! WAV export of remix results.

use std::io::Write;

use crate::{FormatError, RemixOutput};

impl RemixOutput {
    /// Encode as a 32-bit float WAV file.
    pub fn write_wav(&self, w: &mut impl Write) -> Result<(), FormatError> {
        cm_formats::write_wav(w, &self.format, &self.samples)
    }

    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, FormatError> {
        cm_formats::wav_to_bytes(&self.format, &self.samples)
    }
}
