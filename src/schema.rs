use serde::{
    de::{
        self,
        DeserializeOwned,
        Visitor,
    },
    Deserializer,
    Serialize,
};

use crate::db::{
    Dataset, Job, Model, Pipeline, Record,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub fields: Vec<&'static str>,
}

// a deserializer that never yields a value: it only records the field
// names a derived `Deserialize` asks for
struct FieldProbe<'a> {
    fields: &'a mut Option<&'static [&'static str]>,
}

impl<'de, 'a> Deserializer<'de> for FieldProbe<'a> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.fields = Some(fields);
        Err(de::Error::custom("probed"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// Top-level field names of `T`, in declaration order, as they appear on the wire.
pub fn field_names<T: DeserializeOwned>() -> Vec<&'static str> {
    let mut fields = None;
    let _ = T::deserialize(FieldProbe { fields: &mut fields });
    fields
        .map(|f| f.to_vec())
        .unwrap_or_default()
}

fn describe<T: Record + DeserializeOwned>() -> CollectionSchema {
    CollectionSchema {
        name: T::COLLECTION,
        fields: field_names::<T>(),
    }
}

pub fn collections() -> Vec<CollectionSchema> {
    vec![
        describe::<Model>(),
        describe::<Pipeline>(),
        describe::<Dataset>(),
        describe::<Job>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_collections_in_order() {
        let names: Vec<_> = collections().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["model", "pipeline", "dataset", "job"]);
    }

    #[test]
    fn model_fields_follow_declaration_order() {
        assert_eq!(
            field_names::<Model>(),
            vec![
                "name",
                "description",
                "identity_seed",
                "tags",
                "style_preset",
                "face_embeddings",
                "consistency_profile",
            ]
        );
    }

    #[test]
    fn renamed_fields_use_wire_names() {
        let fields = field_names::<Job>();
        assert_eq!(fields[0], "type");
        assert!(!fields.contains(&"kind"));
        assert_eq!(
            fields,
            vec!["type", "model_id", "pipeline_id", "params", "status", "progress", "output"]
        );
    }

    #[test]
    fn pipeline_and_dataset_fields() {
        assert_eq!(
            field_names::<Pipeline>(),
            vec!["name", "version", "is_active", "nodes", "edges"]
        );
        assert_eq!(
            field_names::<Dataset>(),
            vec!["model_id", "title", "status", "size", "items"]
        );
    }

    #[test]
    fn non_structs_have_no_fields() {
        assert!(field_names::<String>().is_empty());
    }
}
