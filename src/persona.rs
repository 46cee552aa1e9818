//! Deterministic personality generation.
//!
//! A role's personality is a pure function of its name: the name is hashed
//! with SHA-256, the first 8 bytes seed a ChaCha8 stream, and the stream
//! drives every draw. The same name yields byte-identical output across
//! processes and platforms.
//!
//! ChaCha8 is used (rather than `StdRng`) because its output stream is part
//! of the algorithm's definition and does not change between `rand`
//! releases. Changing any candidate set below is a breaking change to every
//! previously generated personality.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const STYLES: [&str; 5] = ["concise", "friendly", "formal", "humorous", "analytical"];
pub const TONES: [&str; 5] = ["neutral", "positive", "curious", "confident", "warm"];
pub const TRAITS: [&str; 6] = [
    "patient",
    "creative",
    "precise",
    "curious",
    "efficient",
    "empathetic",
];
pub const EXPERTISE: [&str; 6] = [
    "general",
    "customer_support",
    "education",
    "finance",
    "coding",
    "health",
];

/// Generated attribute set attached to a role.
///
/// `traits` always holds exactly two distinct values, in draw order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub style: String,
    pub tone: String,
    pub traits: Vec<String>,
    pub expertise: String,
}

/// Derive the PRNG seed from a role name: first 8 bytes of
/// SHA-256(UTF-8 name), interpreted big-endian.
fn seed_from_name(name: &str) -> u64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Generate the personality for a role name.
pub fn generate(name: &str) -> Personality {
    let mut rng = ChaCha8Rng::seed_from_u64(seed_from_name(name));

    let style = pick(&mut rng, &STYLES);
    let tone = pick(&mut rng, &TONES);
    let traits = pick_two(&mut rng, &TRAITS);
    let expertise = pick(&mut rng, &EXPERTISE);

    Personality {
        style,
        tone,
        traits,
        expertise,
    }
}

fn pick(rng: &mut ChaCha8Rng, set: &[&str]) -> String {
    set[rng.gen_range(0..set.len())].to_string()
}

/// Draw two distinct values, preserving draw order.
///
/// The second index is drawn from a range one smaller and shifted past the
/// first, so exactly two uniform draws are consumed from the stream.
fn pick_two(rng: &mut ChaCha8Rng, set: &[&str]) -> Vec<String> {
    let first = rng.gen_range(0..set.len());
    let mut second = rng.gen_range(0..set.len() - 1);
    if second >= first {
        second += 1;
    }
    vec![set[first].to_string(), set[second].to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_personality() {
        let a = generate("张三");
        let b = generate("张三");
        assert_eq!(a, b);
    }

    #[test]
    fn serialized_form_is_stable() {
        let a = serde_json::to_value(generate("李四")).unwrap();
        let b = serde_json::to_value(generate("李四")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_names_are_independent() {
        // Interleaving calls must not affect the output.
        let a1 = generate("A");
        let _ = generate("B");
        let a2 = generate("A");
        assert_eq!(a1, a2);
    }

    #[test]
    fn traits_are_two_and_distinct() {
        for name in ["A", "B", "张三", "customer bot", "", "🦀"] {
            let p = generate(name);
            assert_eq!(p.traits.len(), 2, "name {name:?}");
            assert_ne!(p.traits[0], p.traits[1], "name {name:?}");
        }
    }

    #[test]
    fn values_come_from_candidate_sets() {
        let p = generate("王五");
        assert!(STYLES.contains(&p.style.as_str()));
        assert!(TONES.contains(&p.tone.as_str()));
        assert!(EXPERTISE.contains(&p.expertise.as_str()));
        for t in &p.traits {
            assert!(TRAITS.contains(&t.as_str()));
        }
    }

    #[test]
    fn seed_is_big_endian_prefix_of_sha256() {
        // SHA-256("") = e3b0c44298fc1c14...
        assert_eq!(seed_from_name(""), 0xe3b0_c442_98fc_1c14);
    }
}
