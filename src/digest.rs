use std::fmt;

const FNV1A_PRIME: u128 = 0x0000000001000000000000000000013B;
const FNV1A_OFFSET_BASIS: u128 = 0x6c62272e07bb014262b821756295c58d;

/// 128-bit FNV-1a fingerprint, rendered as hex for problem IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Digest(u128);

impl Default for Digest {
    #[inline]
    fn default() -> Self {
        Self(FNV1A_OFFSET_BASIS)
    }
}

impl Digest {
    #[inline]
    pub(crate) fn update<T: Into<u128>>(&mut self, value: T) {
        self.0 = (self.0 ^ value.into()).wrapping_mul(FNV1A_PRIME);
    }

    pub(crate) fn update_str(&mut self, value: &str) {
        for byte in value.bytes() {
            self.update(byte);
        }
    }
}

impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
