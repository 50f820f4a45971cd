//! Fluent recipe builder
//!
//! A [`DataBuilder`] accumulates a recipe of [`RecipeElement`] values and
//! flattens it into a byte vector on demand. Every append converts its
//! argument immediately, using the text encoding and byte order that are
//! current at the time of the call; later configuration changes never touch
//! elements that were already appended.
//!
//! # Sharing
//!
//! `DataBuilder` is a reference-counted handle. Cloning it yields a second
//! handle onto the *same* recipe, and [`DataBuilder::repeat`] stores such a
//! handle rather than a snapshot. Appending to a pattern after it has been
//! repeated is therefore visible the next time the outer builder is built:
//!
//! ```
//! # use databuilder::DataBuilder;
//! let pattern = DataBuilder::new();
//! pattern.append_u8(0xaa);
//! let outer = DataBuilder::new();
//! outer.repeat(2, &pattern)?;
//! assert_eq!(outer.build(), [0xaa, 0xaa]);
//!
//! pattern.append_u8(0xbb);
//! assert_eq!(outer.build(), [0xaa, 0xbb, 0xaa, 0xbb]);
//! # Ok::<(), databuilder::InvalidArgument>(())
//! ```
//!
//! Use [`DataBuilder::fork`] to obtain an independent copy instead.
//!
//! # Cycles
//!
//! A builder may never (directly or transitively) repeat itself.
//! [`DataBuilder::repeat`] rejects any pattern whose recipe graph already
//! reaches the receiver, so every recipe graph is acyclic and building,
//! comparing, and hashing always terminate.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::encoding::TextEncoding;
use crate::error::{InvalidArgument, Result};
use crate::integral::Integral;
use crate::order::ByteOrder;
use crate::recipe::RecipeElement;
use crate::settings::Settings;
use crate::target::Target;
use crate::util::hex_of_bytes;

#[derive(Clone, Default)]
struct Recipe {
    elements: Vec<RecipeElement>,
    settings: Settings,
}

/// Builder for small binary data samples
///
/// Clients create a builder, call the `append_*` and `set_*` methods in
/// fluent style, and finally call [`build`](DataBuilder::build). The order in
/// which appends are made is the order in which their bytes appear in the
/// output.
///
/// ```
/// # use databuilder::{ByteOrder, DataBuilder};
/// let data = DataBuilder::new()
///     .set_byte_order(ByteOrder::BigEndian)
///     .append_u16(0x0102)
///     .append_text("OK")
///     .build();
/// assert_eq!(data, [0x01, 0x02, b'O', b'K']);
/// ```
///
/// Equality and hashing consider only the recipe, never the handle identity
/// or the current settings. Since the recipe can be mutated through any
/// handle, a builder should not be mutated while it is used as a key in a
/// hashed collection.
#[derive(Clone, Default)]
pub struct DataBuilder {
    inner: Rc<RefCell<Recipe>>,
}

impl DataBuilder {
    /// Creates an empty builder using ASCII text and little-endian integers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder with the given initial settings
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Recipe {
                elements: Vec::new(),
                settings,
            })),
        }
    }

    /// Returns a new builder with a copy of this builder's recipe and settings.
    ///
    /// The copy has its own identity, so appending to either builder does not
    /// affect the other. Patterns referenced by repeat elements stay shared.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(self.inner.borrow().clone())),
        }
    }

    /// Returns `true` if both handles refer to the same builder
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.inner, &other.inner)
    }

    /// Current text encoding and byte order
    pub fn settings(&self) -> Settings {
        self.inner.borrow().settings
    }

    /// Encoding applied to the next `append_text`
    pub fn encoding(&self) -> TextEncoding {
        self.settings().encoding
    }

    /// Byte order applied to the next integer append
    pub fn byte_order(&self) -> ByteOrder {
        self.settings().byte_order
    }

    /// Replaces both settings at once. Already appended elements are unaffected.
    pub fn set_settings(&self, settings: Settings) -> &Self {
        self.inner.borrow_mut().settings = settings;
        self
    }

    /// Sets the encoding to use when appending text.
    /// Any text that has already been appended is unaffected.
    pub fn set_encoding(&self, encoding: TextEncoding) -> &Self {
        self.inner.borrow_mut().settings.encoding = encoding;
        self
    }

    /// Sets the encoding by label, as accepted by [`TextEncoding::from_name`].
    ///
    /// Fails without changing the current encoding if the label is unknown.
    pub fn set_encoding_name(&self, label: &str) -> Result<&Self> {
        let encoding = TextEncoding::from_name(label)?;
        Ok(self.set_encoding(encoding))
    }

    /// Sets the byte order to use when appending integers.
    /// Any integers that have already been appended are unaffected.
    pub fn set_byte_order(&self, byte_order: ByteOrder) -> &Self {
        self.inner.borrow_mut().settings.byte_order = byte_order;
        self
    }

    fn push(&self, element: RecipeElement) -> &Self {
        self.inner.borrow_mut().elements.push(element);
        self
    }

    /// Appends a private copy of an arbitrary chunk of bytes
    pub fn append_bytes<B: AsRef<[u8]>>(&self, value: B) -> &Self {
        let bytes = value.as_ref();
        trace!(len = bytes.len(), "appending bytes");
        self.push(RecipeElement::literal(bytes))
    }

    /// Appends `value` in the current encoding, without any terminator
    pub fn append_text(&self, value: &str) -> &Self {
        let encoding = self.encoding();
        let bytes = encoding.encode(value);
        trace!(%encoding, len = bytes.len(), "appending text");
        self.push(RecipeElement::Literal(bytes.into_boxed_slice()))
    }

    /// Appends a fixed-width integer in the current byte order
    pub fn append_int<T: Integral>(&self, value: T) -> &Self {
        let byte_order = self.byte_order();
        let bytes = byte_order.orient(value.native_bytes());
        trace!(%byte_order, width = T::LEN, "appending integer");
        self.push(RecipeElement::literal(bytes.as_ref()))
    }

    /// Appends a signed byte
    pub fn append_i8(&self, value: i8) -> &Self {
        self.append_int(value)
    }

    /// Appends an unsigned byte
    pub fn append_u8(&self, value: u8) -> &Self {
        self.append_int(value)
    }

    /// Appends a 16-bit signed integer in the current byte order
    pub fn append_i16(&self, value: i16) -> &Self {
        self.append_int(value)
    }

    /// Appends a 16-bit unsigned integer in the current byte order
    pub fn append_u16(&self, value: u16) -> &Self {
        self.append_int(value)
    }

    /// Appends a 32-bit signed integer in the current byte order
    pub fn append_i32(&self, value: i32) -> &Self {
        self.append_int(value)
    }

    /// Appends a 32-bit unsigned integer in the current byte order
    pub fn append_u32(&self, value: u32) -> &Self {
        self.append_int(value)
    }

    /// Appends a 64-bit signed integer in the current byte order
    pub fn append_i64(&self, value: i64) -> &Self {
        self.append_int(value)
    }

    /// Appends a 64-bit unsigned integer in the current byte order
    pub fn append_u64(&self, value: u64) -> &Self {
        self.append_int(value)
    }

    /// Appends `count` repetitions of the recipe of `pattern`.
    ///
    /// The pattern is held by reference and evaluated at build time, so later
    /// appends to it are reflected in subsequent builds of `self`.
    ///
    /// # Errors
    ///
    /// * [`InvalidArgument::SelfRepeat`] if `pattern` is `self`
    /// * [`InvalidArgument::CyclicRepeat`] if `pattern` already repeats `self`, at any depth
    pub fn repeat(&self, count: u32, pattern: &DataBuilder) -> Result<&Self> {
        if Self::ptr_eq(self, pattern) {
            debug!(count, "rejected repeat of a builder by itself");
            return Err(InvalidArgument::SelfRepeat);
        }
        if pattern.reaches(self) {
            debug!(count, "rejected repeat that would form a cycle");
            return Err(InvalidArgument::CyclicRepeat);
        }
        trace!(count, "appending repeat");
        Ok(self.push(RecipeElement::Repeat {
            count,
            pattern: pattern.clone(),
        }))
    }

    /// Returns `true` if `needle` is repeated anywhere in the recipe graph below `self`
    fn reaches(&self, needle: &DataBuilder) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![self.clone()];
        while let Some(node) = pending.pop() {
            if !seen.insert(Rc::as_ptr(&node.inner)) {
                continue;
            }
            let recipe = node.inner.borrow();
            for element in recipe.elements.iter() {
                if let RecipeElement::Repeat { pattern, .. } = element {
                    if Self::ptr_eq(pattern, needle) {
                        return true;
                    }
                    pending.push(pattern.clone());
                }
            }
        }
        false
    }

    /// Builds the data according to the current recipe.
    ///
    /// Building does not consume or alter the recipe; calling it again without
    /// intervening appends yields an identical result.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut buf: Vec<u8> = Target::create();
        buf.anticipate(self.encoded_len());
        let len = self.write_to(&mut buf);
        debug!(elements = self.element_count(), len, "built recipe");
        buf
    }

    /// Builds the data and formats it as a lowercase hex string
    #[must_use]
    pub fn build_hex(&self) -> String {
        hex_of_bytes(self.build())
    }

    /// Appends the materialized recipe to an arbitrary [`Target`], returning the number of bytes written
    pub fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.inner
            .borrow()
            .elements
            .iter()
            .map(|element| element.write_to(buf))
            .sum()
    }

    /// Number of bytes [`build`](DataBuilder::build) would currently produce,
    /// saturating at `usize::MAX` for recipes too large to address
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.inner
            .borrow()
            .elements
            .iter()
            .map(RecipeElement::encoded_len)
            .fold(0, usize::saturating_add)
    }

    /// Number of top-level elements in the recipe
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.inner.borrow().elements.len()
    }

    /// Returns `true` if nothing has been appended yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    /// Snapshot of the top-level recipe elements, in order
    #[must_use]
    pub fn elements(&self) -> Vec<RecipeElement> {
        self.inner.borrow().elements.clone()
    }
}

impl From<Settings> for DataBuilder {
    fn from(settings: Settings) -> Self {
        Self::with_settings(settings)
    }
}

impl PartialEq for DataBuilder {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.inner.borrow().elements == other.inner.borrow().elements
    }
}

impl Eq for DataBuilder {}

impl Hash for DataBuilder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.borrow().elements.hash(state)
    }
}

impl Debug for DataBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataBuilder")
            .field("recipe_elements", &self.inner.borrow().elements)
            .finish()
    }
}

impl Display for DataBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DataBuilder[")?;
        for (ix, element) in self.inner.borrow().elements.iter().enumerate() {
            if ix > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{element}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use proptest::prelude::*;

    use super::*;

    fn hash_of(b: &DataBuilder) -> u64 {
        let mut h = DefaultHasher::new();
        b.hash(&mut h);
        h.finish()
    }

    #[test]
    fn build_empty() {
        assert!(DataBuilder::new().build().is_empty());
        assert!(DataBuilder::new().is_empty());
    }

    #[test]
    fn copy_data() {
        let mut source = vec![1u8, 2, 3];
        let b = DataBuilder::new();
        b.append_bytes(&source);
        let result = b.build();
        assert_eq!(result, source);
        source[1] = 0xff;
        assert_eq!(b.build(), [1, 2, 3]);
    }

    #[test]
    fn concatenate_data() {
        let result = DataBuilder::new()
            .append_bytes([1u8, 2, 3])
            .append_bytes(vec![4u8, 5, 6])
            .build();
        assert_eq!(result, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn strings_in_each_encoding() {
        let cases: [(&str, &[u8]); 4] = [
            ("ascii", &[0x46, 0x6f, 0x6f, 0x3f]),
            ("utf-8", &[0x46, 0x6f, 0x6f, 0xe2, 0x82, 0xac]),
            ("unicode", &[0x46, 0x00, 0x6f, 0x00, 0x6f, 0x00, 0xac, 0x20]),
            ("bigendianunicode", &[0x00, 0x46, 0x00, 0x6f, 0x00, 0x6f, 0x20, 0xac]),
        ];
        for (label, expected) in cases {
            let result = DataBuilder::new()
                .set_encoding_name(label)
                .unwrap()
                .append_text("Foo€")
                .build();
            assert_eq!(result, expected, "{label}");
        }
    }

    #[test]
    fn unknown_encoding_keeps_current() {
        let b = DataBuilder::new();
        b.set_encoding(TextEncoding::Utf8);
        assert_eq!(
            b.set_encoding_name("klingon").unwrap_err(),
            InvalidArgument::UnknownEncoding("klingon".into())
        );
        assert_eq!(b.encoding(), TextEncoding::Utf8);
    }

    #[test]
    fn encoding_applies_to_later_text_only() {
        let b = DataBuilder::new();
        b.append_text("€").set_encoding(TextEncoding::Utf8).append_text("€");
        assert_eq!(b.build(), [0x3f, 0xe2, 0x82, 0xac]);
    }

    #[test]
    fn astral_text_replaced_per_code_unit() {
        let ascii = DataBuilder::new().append_text("a\u{1F600}b").build();
        assert_eq!(ascii, [0x61, 0x3f, 0x3f, 0x62]);
        let latin1 = DataBuilder::new()
            .set_encoding(TextEncoding::Latin1)
            .append_text("\u{1F600}")
            .build();
        assert_eq!(latin1, [0x3f, 0x3f]);
    }

    #[test]
    fn signed_little_endian() {
        let result = DataBuilder::new()
            .set_byte_order(ByteOrder::LittleEndian)
            .append_i8(-1)
            .append_i16(-2)
            .append_i32(-3)
            .append_i64(-4)
            .build();
        assert_eq!(
            result,
            [
                0xff, 0xfe, 0xff, 0xfd, 0xff, 0xff, 0xff, 0xfc, 0xff, 0xff, 0xff, 0xff, 0xff,
                0xff, 0xff
            ]
        );
    }

    #[test]
    fn signed_big_endian() {
        let result = DataBuilder::new()
            .set_byte_order(ByteOrder::BigEndian)
            .append_i8(-1)
            .append_i16(-2)
            .append_i32(-3)
            .append_i64(-4)
            .build();
        assert_eq!(
            result,
            [
                0xff, 0xff, 0xfe, 0xff, 0xff, 0xff, 0xfd, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
                0xff, 0xfc
            ]
        );
    }

    #[test]
    fn unsigned_both_orders() {
        let le = DataBuilder::new()
            .append_u8(1)
            .append_u16(2)
            .append_u32(3)
            .append_u64(4)
            .build();
        assert_eq!(le, [1, 2, 0, 3, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0]);

        let be = DataBuilder::with_settings(Settings::default().with_byte_order(ByteOrder::BigEndian));
        be.append_u8(1).append_u16(2).append_u32(3).append_u64(4);
        assert_eq!(be.build(), [1, 0, 2, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 4]);
    }

    #[test]
    fn build_repeating() {
        let result = DataBuilder::new()
            .repeat(4, DataBuilder::new().append_u8(0xff))
            .unwrap()
            .build();
        assert_eq!(result, [0xff; 4]);

        let none = DataBuilder::new()
            .append_u8(1)
            .repeat(0, DataBuilder::new().append_bytes(b"ignored"))
            .unwrap()
            .append_u8(2)
            .build();
        assert_eq!(none, [1, 2]);
    }

    #[test]
    fn nested_repeats() {
        let inner = DataBuilder::new();
        inner.append_u8(0xab);
        let middle = DataBuilder::new();
        middle.repeat(2, &inner).unwrap().append_u8(0);
        let outer = DataBuilder::new();
        outer.repeat(3, &middle).unwrap();
        assert_eq!(outer.build_hex(), "abab00abab00abab00");
        assert_eq!(outer.encoded_len(), 9);
    }

    #[test]
    fn oversized_recipe_len_saturates() {
        let word = DataBuilder::new();
        word.append_u32(0xdead_beef);
        let row = DataBuilder::new();
        row.repeat(u32::MAX, &word).unwrap();
        let table = DataBuilder::new();
        table.append_u8(1).repeat(u32::MAX, &row).unwrap().append_u8(2);
        assert_eq!(table.encoded_len(), usize::MAX);
        assert_eq!(table.element_count(), 3);
    }

    #[test]
    fn pattern_mutation_is_observed() {
        let pattern = DataBuilder::new();
        let outer = DataBuilder::new();
        outer.repeat(2, &pattern).unwrap();
        assert!(outer.build().is_empty());
        pattern.append_u8(7);
        assert_eq!(outer.build(), [7, 7]);
    }

    #[test]
    fn fork_is_independent() {
        let a = DataBuilder::new();
        a.append_u8(1);
        let b = a.fork();
        b.append_u8(2);
        assert_eq!(a.build(), [1]);
        assert_eq!(b.build(), [1, 2]);
        assert!(!DataBuilder::ptr_eq(&a, &b));
        assert!(DataBuilder::ptr_eq(&a, &a.clone()));
    }

    #[test]
    fn self_repeat_rejected() {
        let b = DataBuilder::new();
        b.append_u8(1);
        for count in [0, 1, 5] {
            assert_eq!(b.repeat(count, &b).unwrap_err(), InvalidArgument::SelfRepeat);
            assert_eq!(b.repeat(count, &b.clone()).unwrap_err(), InvalidArgument::SelfRepeat);
        }
        assert_eq!(b.element_count(), 1);
    }

    #[test]
    fn indirect_cycle_rejected() {
        let a = DataBuilder::new();
        let b = DataBuilder::new();
        let c = DataBuilder::new();
        a.repeat(1, &b).unwrap();
        b.repeat(1, &c).unwrap();
        assert_eq!(b.repeat(1, &a).unwrap_err(), InvalidArgument::CyclicRepeat);
        assert_eq!(c.repeat(2, &a).unwrap_err(), InvalidArgument::CyclicRepeat);
        // sharing a pattern without a cycle is fine
        a.repeat(3, &c).unwrap();
        c.append_u8(9);
        assert_eq!(a.build(), [9, 9, 9, 9]);
    }

    #[test]
    fn build_is_idempotent() {
        let b = DataBuilder::new();
        b.append_text("abc").repeat(2, DataBuilder::new().append_u16(0xbeef)).unwrap();
        assert_eq!(b.build(), b.build());
    }

    #[test]
    fn equality_is_structural() {
        let a = DataBuilder::new();
        a.append_u16(0x0201).append_text("x");
        let b = DataBuilder::new();
        b.append_bytes([0x01u8, 0x02]).append_bytes(b"x");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        // split literals are a different recipe even if they build the same bytes
        let c = DataBuilder::new();
        c.append_u8(0x01).append_u8(0x02).append_bytes(b"x");
        assert_eq!(c.build(), a.build());
        assert_ne!(a, c);
    }

    #[test]
    fn settings_do_not_affect_equality() {
        let a = DataBuilder::new();
        a.append_u32(5);
        let b = DataBuilder::new();
        b.append_u32(5).set_byte_order(ByteOrder::BigEndian).set_encoding(TextEncoding::Utf32Be);
        assert_eq!(a, b);
        assert_eq!(b.build(), [5, 0, 0, 0]);
    }

    #[test]
    fn repeat_equality_follows_patterns() {
        let p1 = DataBuilder::new();
        p1.append_u8(1);
        let p2 = DataBuilder::new();
        p2.append_u8(1);
        let a = DataBuilder::new();
        a.repeat(3, &p1).unwrap();
        let b = DataBuilder::new();
        b.repeat(3, &p2).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        p2.append_u8(2);
        assert_ne!(a, b);
    }

    #[test]
    fn renders_type_name() {
        let b = DataBuilder::new();
        b.append_u8(1)
            .append_u16(2)
            .append_u32(3)
            .append_u64(4)
            .append_u8(0xff)
            .append_text("Foo");
        assert!(format!("{b:?}").starts_with("DataBuilder"));
        assert_eq!(
            b.to_string(),
            "DataBuilder[01, 0200, 03000000, 0400000000000000, ff, 466f6f]"
        );

        let outer = DataBuilder::new();
        outer.repeat(2, &b.fork()).unwrap();
        assert!(outer.to_string().starts_with("DataBuilder[2xDataBuilder[01"));
    }

    proptest! {
        #[test]
        fn append_bytes_copies(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut source = data.clone();
            let b = DataBuilder::new();
            b.append_bytes(&source);
            let built = b.build();
            prop_assert_eq!(&built, &data);
            source.iter_mut().for_each(|x| *x = x.wrapping_add(1));
            prop_assert_eq!(b.build(), data);
        }

        #[test]
        fn append_concatenates(
            b1 in proptest::collection::vec(any::<u8>(), 0..32),
            b2 in proptest::collection::vec(any::<u8>(), 0..32),
        ) {
            let built = DataBuilder::new().append_bytes(&b1).append_bytes(&b2).build();
            prop_assert_eq!(built.len(), b1.len() + b2.len());
            prop_assert_eq!(built, [b1, b2].concat());
        }

        #[test]
        fn integers_match_std(v in any::<i64>(), w in any::<u16>()) {
            let le = DataBuilder::new().append_i64(v).append_u16(w).build();
            prop_assert_eq!(le, [&v.to_le_bytes()[..], &w.to_le_bytes()[..]].concat());
            let be = DataBuilder::new()
                .set_byte_order(ByteOrder::BigEndian)
                .append_i64(v)
                .append_u16(w)
                .build();
            prop_assert_eq!(be, [&v.to_be_bytes()[..], &w.to_be_bytes()[..]].concat());
        }

        #[test]
        fn repeat_len(count in 0u32..16, pattern in proptest::collection::vec(any::<u8>(), 0..8)) {
            let outer = DataBuilder::new();
            outer.repeat(count, DataBuilder::new().append_bytes(&pattern)).unwrap();
            let built = outer.build();
            prop_assert_eq!(built.len(), count as usize * pattern.len());
            prop_assert_eq!(outer.encoded_len(), built.len());
            prop_assert_eq!(built, pattern.repeat(count as usize));
        }
    }
}
