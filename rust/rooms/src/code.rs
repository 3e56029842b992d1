use rand::Rng;

/// Uppercase letters and digits without the easily confused I, O, 0 and 1.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LEN: usize = 6;

pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| {
            let i = rng.random_range(0..ROOM_CODE_ALPHABET.len());
            char::from(ROOM_CODE_ALPHABET[i])
        })
        .collect()
}

/// Canonical form used as the registry key; lookups are case-insensitive.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_valid_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN && code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn codes_use_only_the_alphabet() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let code = generate_code(&mut rng);
            assert!(is_valid_code(&code), "{code}");
        }
    }

    #[test]
    fn alphabet_has_no_ambiguous_characters() {
        assert_eq!(ROOM_CODE_ALPHABET.len(), 32);
        for c in b"IO01" {
            assert!(!ROOM_CODE_ALPHABET.contains(c));
        }
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize_code(" abc234 "), "ABC234");
        assert!(!is_valid_code("ABC10X"));
    }
}
