use bytes::{Bytes, BytesMut};

use crate::buffer::ByteBuffer;
use crate::error::{CodecError, DecodeError, Result, ValueError};
use crate::registry::CodecRegistry;
use crate::schema::Schema;
use crate::value::Value;

/// A Rust type with a fixed field layout.
///
/// `schema` describes the wire order, `to_values` lists the field values in
/// that order and `from_values` rebuilds the type from them.
pub trait Record: Sized {
    fn schema() -> &'static Schema;

    fn to_values(&self) -> Vec<Value>;

    fn from_values(values: Vec<Value>) -> std::result::Result<Self, ValueError>;
}

/// Sequential reader over decoded values, for implementing
/// [`Record::from_values`].
#[derive(Debug)]
pub struct Fields {
    inner: std::vec::IntoIter<Value>,
}

impl Fields {
    /// Fails unless exactly `expected` values are present.
    pub fn new(values: Vec<Value>, expected: usize) -> std::result::Result<Self, ValueError> {
        if values.len() != expected {
            return Err(ValueError::FieldCount {
                expected,
                found: values.len(),
            });
        }
        Ok(Self {
            inner: values.into_iter(),
        })
    }

    /// Convert the next value.
    pub fn take<T>(&mut self) -> std::result::Result<T, ValueError>
    where
        T: TryFrom<Value, Error = ValueError>,
    {
        let value = self.inner.next().ok_or(ValueError::FieldCount {
            expected: 1,
            found: 0,
        })?;
        T::try_from(value)
    }
}

/// Encode `values` in `schema` order, appending to `dst`.
///
/// Nothing is appended if any field fails.
pub fn encode_record(
    registry: &CodecRegistry,
    schema: &Schema,
    values: &[Value],
    dst: &mut BytesMut,
) -> Result<()> {
    if values.len() != schema.len() {
        return Err(CodecError::FieldCount {
            expected: schema.len(),
            found: values.len(),
        });
    }

    let start = dst.len();
    for (field, value) in schema.fields().iter().zip(values) {
        let encoded = registry
            .lookup(&field.tag)
            .and_then(|serializer| {
                serializer
                    .encode(value, dst)
                    .map_err(|source| CodecError::Encode {
                        field: field.name.to_string(),
                        source,
                    })
            });
        if let Err(err) = encoded {
            dst.truncate(start);
            return Err(err);
        }
    }
    Ok(())
}

/// Encode `values` into a fresh buffer.
pub fn encode_to_bytes(
    registry: &CodecRegistry,
    schema: &Schema,
    values: &[Value],
) -> Result<Bytes> {
    let mut dst = BytesMut::new();
    encode_record(registry, schema, values, &mut dst)?;
    Ok(dst.freeze())
}

/// Decode one record from the front of `buf`.
///
/// Fields are decoded strictly left to right and decoding stops at the
/// first failure. Bytes taken by an incomplete field are put back, so on
/// [`CodecError::Truncated`] the buffer starts at the failing field; fields
/// decoded before it stay consumed. Trailing bytes after the record are left
/// in `buf`.
pub fn decode_record(
    registry: &CodecRegistry,
    schema: &Schema,
    buf: &mut ByteBuffer,
) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let serializer = registry.lookup(&field.tag)?;
        match serializer.decode(buf) {
            Ok(value) => values.push(value),
            Err(DecodeError::Incomplete { popped }) => {
                buf.restore(popped);
                return Err(CodecError::Truncated {
                    field: field.name.to_string(),
                });
            }
            Err(source) => {
                return Err(CodecError::Malformed {
                    field: field.name.to_string(),
                    source,
                })
            }
        }
    }
    Ok(values)
}

/// Decode one record from an owned byte sequence.
pub fn decode_bytes(
    registry: &CodecRegistry,
    schema: &Schema,
    bytes: impl Into<ByteBuffer>,
) -> Result<Vec<Value>> {
    let mut buf = bytes.into();
    decode_record(registry, schema, &mut buf)
}

/// Encode a typed record.
pub fn encode<R: Record>(registry: &CodecRegistry, record: &R) -> Result<Bytes> {
    encode_to_bytes(registry, R::schema(), &record.to_values())
}

/// Decode a typed record.
pub fn decode<R: Record>(registry: &CodecRegistry, bytes: impl Into<ByteBuffer>) -> Result<R> {
    let values = decode_bytes(registry, R::schema(), bytes)?;
    Ok(R::from_values(values)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, LazyLock};

    use bytes::BufMut;
    use proptest::prelude::*;

    use super::*;
    use crate::schema::TypeTag;
    use crate::serializer::{Serializer, TupleSerializer};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct MyClass {
        pub some_bytes: Bytes,
        pub number: u64,
        pub negative_number: i64,
        pub text: String,
        pub boolean: bool,
        pub another_boolean: bool,
        pub f64: f64,
    }

    static MY_CLASS: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("MyClass")
            .field("some_bytes", TypeTag::Bytes)
            .field("number", TypeTag::UInt)
            .field("negative_number", TypeTag::Int)
            .field("text", TypeTag::Text)
            .field("boolean", TypeTag::Bool)
            .field("another_boolean", TypeTag::Bool)
            .field("f64", TypeTag::F64)
            .build()
    });

    impl Record for MyClass {
        fn schema() -> &'static Schema {
            &MY_CLASS
        }

        fn to_values(&self) -> Vec<Value> {
            vec![
                self.some_bytes.clone().into(),
                self.number.into(),
                self.negative_number.into(),
                self.text.clone().into(),
                self.boolean.into(),
                self.another_boolean.into(),
                self.f64.into(),
            ]
        }

        fn from_values(values: Vec<Value>) -> std::result::Result<Self, ValueError> {
            let mut fields = Fields::new(values, 7)?;
            Ok(Self {
                some_bytes: fields.take()?,
                number: fields.take()?,
                negative_number: fields.take()?,
                text: fields.take()?,
                boolean: fields.take()?,
                another_boolean: fields.take()?,
                f64: fields.take()?,
            })
        }
    }

    pub(crate) fn instance() -> MyClass {
        MyClass {
            some_bytes: Bytes::from_static(b"some bytes"),
            number: 1234,
            negative_number: -1234,
            text: "hello".to_string(),
            boolean: true,
            another_boolean: false,
            f64: 1.23456789,
        }
    }

    #[test]
    fn scenario_encodes_deterministically_and_round_trips() {
        let registry = CodecRegistry::new();
        let wire = encode(&registry, &instance()).unwrap();

        let mut expected = BytesMut::new();
        expected.put_u64_le(10);
        expected.put_slice(b"some bytes");
        expected.put_u64_le(1234);
        expected.put_i64_le(-1234);
        expected.put_u64_le(5);
        expected.put_slice(b"hello");
        expected.put_u8(1);
        expected.put_u8(0);
        expected.put_slice(&1.23456789f64.to_ne_bytes());
        assert_eq!(wire, expected.freeze());

        assert_eq!(encode(&registry, &instance()).unwrap(), wire);
        assert_eq!(decode::<MyClass>(&registry, wire).unwrap(), instance());
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn decodes_known_interop_vector() {
        let wire: &[u8] = &[
            6, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 210, 4, 0, 0, 0, 0, 0, 0, 46, 251, 255, 255,
            255, 255, 255, 255, 21, 0, 0, 0, 0, 0, 0, 0, 207, 131, 207, 137, 207, 134, 207, 129,
            206, 191, 207, 131, 225, 191, 160, 204, 129, 206, 189, 206, 183, 1, 0, 122, 0, 139,
            252, 250, 33, 9, 64,
        ];
        let registry = CodecRegistry::new();
        let decoded: MyClass = decode(&registry, wire).unwrap();
        assert_eq!(
            decoded,
            MyClass {
                some_bytes: Bytes::from_static(&[0, 1, 2, 3, 4, 5]),
                number: 1234,
                negative_number: -1234,
                text: "σωφροσῠ́νη".to_string(),
                boolean: true,
                another_boolean: false,
                f64: 3.141592,
            }
        );
    }

    #[test]
    fn float32_field_within_tolerance() {
        let registry = CodecRegistry::new();
        let schema = Schema::builder("MyFloatClass").field("f32", TypeTag::F32).build();

        let wire = encode_to_bytes(&registry, &schema, &[Value::F64(1.234)]).unwrap();
        assert_eq!(wire.len(), 4);

        let values = decode_bytes(&registry, &schema, wire).unwrap();
        let decoded = values[0].as_f64().unwrap();
        assert!(((decoded - 1.234) / 1.234).abs() < 3e-8);
    }

    #[test]
    fn unregistered_type_fails_on_encode_and_decode() {
        let mut registry = CodecRegistry::new();
        registry.register(TypeTag::named("T"), crate::primitives::UIntSerializer);
        let schema = Schema::builder("UsesU")
            .field("t", TypeTag::named("T"))
            .field("u", TypeTag::named("U"))
            .build();

        let values = [Value::UInt(1), Value::UInt(2)];
        let err = encode_to_bytes(&registry, &schema, &values).unwrap_err();
        assert!(
            matches!(err, CodecError::SerializerNotFound(ref tag) if *tag == TypeTag::named("U"))
        );

        let err = decode_bytes(&registry, &schema, vec![0u8; 16]).unwrap_err();
        assert!(matches!(err, CodecError::SerializerNotFound(_)));
    }

    #[test]
    fn failed_encode_appends_nothing() {
        let registry = CodecRegistry::new();
        let schema = Schema::builder("Pair")
            .field("a", TypeTag::UInt)
            .field("b", TypeTag::Bool)
            .build();
        let mut dst = BytesMut::from(&b"keep"[..]);

        let err = encode_record(&registry, &schema, &[Value::UInt(1), Value::UInt(1)], &mut dst)
            .unwrap_err();
        assert!(matches!(err, CodecError::Encode { ref field, .. } if field == "b"));
        assert_eq!(dst.as_ref(), b"keep");

        let err = encode_record(&registry, &schema, &[Value::UInt(1)], &mut dst).unwrap_err();
        assert!(matches!(err, CodecError::FieldCount { expected: 2, found: 1 }));
    }

    #[test]
    fn truncated_input_leaves_buffer_at_failing_field() {
        let registry = CodecRegistry::new();
        let wire = encode(&registry, &instance()).unwrap();
        // some_bytes (18) + number (8) + negative_number (8) + text prefix and 2 body bytes.
        let cut = 18 + 8 + 8 + 8 + 2;

        let mut buf = ByteBuffer::from(wire.slice(..cut));
        let err = decode_record(&registry, MyClass::schema(), &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { ref field } if field == "text"));
        assert!(err.is_data_error());
        assert_eq!(buf.to_bytes(), wire.slice(18 + 8 + 8..cut));
    }

    #[test]
    fn malformed_text_is_reported_with_field() {
        let registry = CodecRegistry::new();
        let schema = Schema::builder("OnlyText").field("text", TypeTag::Text).build();
        let mut wire = BytesMut::new();
        wire.put_u64_le(1);
        wire.put_u8(0xff);

        let err = decode_bytes(&registry, &schema, wire).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { ref field, .. } if field == "text"));
    }

    #[test]
    fn trailing_bytes_stay_in_buffer() {
        let registry = CodecRegistry::new();
        let schema = Schema::builder("One").field("n", TypeTag::UInt).build();
        let mut buf = ByteBuffer::from(&[1u8, 0, 0, 0, 0, 0, 0, 0, 0xaa][..]);

        let values = decode_record(&registry, &schema, &mut buf).unwrap();
        assert_eq!(values, vec![Value::UInt(1)]);
        assert_eq!(buf.to_bytes().as_ref(), &[0xaa]);
    }

    #[test]
    fn wrong_value_count_on_construction() {
        let registry = CodecRegistry::new();
        let short = Schema::builder("Short").field("n", TypeTag::UInt).build();
        let wire = encode_to_bytes(&registry, &short, &[Value::UInt(3)]).unwrap();

        let values = decode_bytes(&registry, &short, wire).unwrap();
        assert!(matches!(
            MyClass::from_values(values),
            Err(ValueError::FieldCount { expected: 7, found: 1 })
        ));
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Point3D {
        x: f64,
        y: f64,
        z: f64,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Sprite {
        name: String,
        position: Point3D,
    }

    static POINT_3D: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("Point3D")
            .field("x", TypeTag::F64)
            .field("y", TypeTag::F64)
            .field("z", TypeTag::F64)
            .build()
    });

    static SPRITE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("Sprite")
            .field("name", TypeTag::Text)
            .field("position", TypeTag::named("Point3D"))
            .build()
    });

    impl Record for Sprite {
        fn schema() -> &'static Schema {
            &SPRITE
        }

        fn to_values(&self) -> Vec<Value> {
            let p = &self.position;
            vec![
                self.name.clone().into(),
                Value::Record(vec![p.x.into(), p.y.into(), p.z.into()]),
            ]
        }

        fn from_values(values: Vec<Value>) -> std::result::Result<Self, ValueError> {
            let mut fields = Fields::new(values, 2)?;
            let name = fields.take()?;
            let mut position = Fields::new(fields.take()?, 3)?;
            Ok(Self {
                name,
                position: Point3D {
                    x: position.take()?,
                    y: position.take()?,
                    z: position.take()?,
                },
            })
        }
    }

    #[test]
    fn custom_serializer_for_nested_record() {
        let sprite = Sprite {
            name: "Test sprite".to_string(),
            position: Point3D {
                x: 1.8,
                y: 3.5,
                z: 9.4,
            },
        };

        let mut registry = CodecRegistry::new();
        assert!(matches!(
            encode(&registry, &sprite),
            Err(CodecError::SerializerNotFound(_))
        ));

        let point = TupleSerializer::from_schema(&registry, &POINT_3D).unwrap();
        let point: Arc<dyn Serializer> = Arc::new(point);
        registry.register_shared(TypeTag::named("Point3D"), point);

        let wire = encode(&registry, &sprite).unwrap();
        assert_eq!(wire.len(), 8 + 11 + 24);
        assert_eq!(decode::<Sprite>(&registry, wire).unwrap(), sprite);
    }

    #[test]
    fn default_registry_has_no_length_cap() {
        let registry = CodecRegistry::new();
        let schema = Schema::builder("Large")
            .field("b", TypeTag::Bytes)
            .field("t", TypeTag::Text)
            .build();
        let big = 16 * 1024 * 1024 + 1;
        let values = vec![Value::from(vec![0xabu8; big]), Value::Text("z".repeat(big))];

        let wire = encode_to_bytes(&registry, &schema, &values).unwrap();
        assert_eq!(wire.len(), 2 * (8 + big));
        assert_eq!(decode_bytes(&registry, &schema, wire).unwrap(), values);
    }

    pub(crate) fn arb_values()-> impl Strategy<Value = (Schema, Vec<Value>)> {
        let field = prop_oneof![
            proptest::collection::vec(any::<u8>(), 0..32)
                .prop_map(|v| (TypeTag::Bytes, Value::from(v))),
            any::<u64>().prop_map(|v| (TypeTag::UInt, Value::UInt(v))),
            any::<i64>().prop_map(|v| (TypeTag::Int, Value::Int(v))),
            any::<f64>()
                .prop_filter("nan never compares equal", |v| !v.is_nan())
                .prop_map(|v| (TypeTag::F64, Value::F64(v))),
            any::<f32>()
                .prop_filter("nan never compares equal", |v| !v.is_nan())
                .prop_map(|v| (TypeTag::F32, Value::F32(v))),
            any::<bool>().prop_map(|v| (TypeTag::Bool, Value::Bool(v))),
            ".{0,16}".prop_map(|v| (TypeTag::Text, Value::Text(v))),
        ];
        proptest::collection::vec(field, 0..10).prop_map(|fields| {
            let (tags, values): (Vec<TypeTag>, Vec<Value>) = fields.into_iter().unzip();
            (Schema::from_tags("Arbitrary", tags), values)
        })
    }

    proptest! {
        #[test]
        fn round_trip((schema, values) in arb_values()) {
            let registry = CodecRegistry::new();
            let wire = encode_to_bytes(&registry, &schema, &values).unwrap();
            let decoded = decode_bytes(&registry, &schema, wire).unwrap();
            prop_assert_eq!(decoded, values);
        }

        #[test]
        fn every_strict_prefix_is_truncated(
            (schema, values) in arb_values(),
            cut in any::<prop::sample::Index>(),
        ) {
            let registry = CodecRegistry::new();
            let wire = encode_to_bytes(&registry, &schema, &values).unwrap();
            prop_assume!(!wire.is_empty());

            let cut = cut.index(wire.len());
            let err = decode_bytes(&registry, &schema, wire.slice(..cut)).unwrap_err();
            prop_assert!(matches!(err, CodecError::Truncated { .. }), "got {:?}", err);
        }
    }
}
