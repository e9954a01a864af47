use core::hash::Hash;
use core::ops::{Deref, DerefMut};

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use hashbrown::HashMap;

/// Hash map wrapper that can be stored in a model file.
///
/// bincode knows nothing about hashbrown, so the map is serialized as a plain
/// vector of key/value pairs and rebuilt on load.
#[derive(Clone, Debug, Default)]
pub struct SerializableHashMap<K, V>(pub HashMap<K, V>);

// not derived: the derive would demand only K: PartialEq, but comparing the
// inner map needs K: Eq + Hash
impl<K, V> PartialEq for SerializableHashMap<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K, V> Deref for SerializableHashMap<K, V> {
    type Target = HashMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> DerefMut for SerializableHashMap<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K, V> Decode for SerializableHashMap<K, V>
where
    K: Decode + Eq + Hash,
    V: Decode,
{
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let raw: Vec<(K, V)> = Decode::decode(decoder)?;
        Ok(Self(raw.into_iter().collect()))
    }
}

impl<K, V> Encode for SerializableHashMap<K, V>
where
    K: Encode,
    V: Encode,
{
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        let raw: Vec<(&K, &V)> = self.0.iter().collect();
        Encode::encode(&raw, encoder)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializable_hash_map_roundtrip() {
        let mut map = SerializableHashMap::<String, u64>::default();
        map.insert("I-GENE".to_string(), 3);
        map.insert("O".to_string(), 7);

        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&map, config).unwrap();
        let (decoded, _): (SerializableHashMap<String, u64>, usize) =
            bincode::decode_from_slice(&bytes, config).unwrap();

        assert_eq!(map, decoded);
    }

    #[test]
    fn test_serializable_hash_map_eq() {
        let mut a = SerializableHashMap::<String, u64>::default();
        a.insert("O".to_string(), 7);
        a.insert("I-GENE".to_string(), 3);
        let mut b = SerializableHashMap::<String, u64>::default();
        b.insert("I-GENE".to_string(), 3);
        b.insert("O".to_string(), 7);

        assert_eq!(a, b);

        b.insert("STOP".to_string(), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_serializable_hash_map_empty() {
        let map = SerializableHashMap::<String, u64>::default();

        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&map, config).unwrap();
        let (decoded, _): (SerializableHashMap<String, u64>, usize) =
            bincode::decode_from_slice(&bytes, config).unwrap();

        assert!(decoded.is_empty());
    }
}
