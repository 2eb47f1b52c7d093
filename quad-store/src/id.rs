use nanoid::nanoid;

/// Canonical alphabet for document identifiers (no ambiguous glyphs).
const DOCUMENT_ID_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
/// Default document id length.
const DOCUMENT_ID_LENGTH: usize = 20;

/// Digits only, used for login codes and username suffixes.
const DIGIT_ALPHABET: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Generates a new document identifier using the configured alphabet and length.
pub fn generate_document_id() -> String {
    nanoid!(DOCUMENT_ID_LENGTH, DOCUMENT_ID_ALPHABET)
}

/// Generates the one-time login code handed out at registration.
pub fn generate_temp_id() -> String {
    nanoid!(8, DIGIT_ALPHABET)
}

/// Generates a run of random digits, used by the username suggestion set.
pub fn random_digits(len: usize) -> String {
    nanoid!(len, DIGIT_ALPHABET)
}
