//! Tag-derived collision filtering with Box2D semantics.
//!
//! Rapier's `InteractionGroups` have no notion of a group index that
//! overrides the category/mask test, so the rule is evaluated by the contact
//! listener's pair filter instead.

const GROUP_RANGE: i64 = 32_000;
const CATEGORY_SLOTS: i64 = 15;

/// Category/mask/group triple attached to every shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category_bits: u16,
    pub mask_bits: u16,
    /// Equal non-zero groups override the masks: positive always collide,
    /// negative never do.
    pub group_index: i16,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category_bits: 0x0001,
            mask_bits: 0xFFFF,
            group_index: 0,
        }
    }
}

impl CollisionFilter {
    pub fn should_collide(&self, other: &Self) -> bool {
        if self.group_index == other.group_index && self.group_index != 0 {
            return self.group_index > 0;
        }
        (self.mask_bits & other.category_bits) != 0 && (self.category_bits & other.mask_bits) != 0
    }

    /// Apply the tag rule used by `World::set_tag_collision_filter`.
    ///
    /// With no targets the tag becomes a negative group, so its members ignore
    /// each other and keep their masks. With targets the tag becomes a positive
    /// group whose mask is the union of the targets' category bits.
    pub fn with_tag_rule(self, tag: &str, collides_with: &[&str]) -> Self {
        let group = tag_group_index(tag);
        if collides_with.is_empty() {
            return Self { group_index: -group, ..self };
        }
        Self {
            category_bits: tag_category_bit(tag),
            mask_bits: collides_with.iter().fold(0, |mask, target| mask | tag_category_bit(target)),
            group_index: group,
        }
    }
}

/// `hash = hash * 31 + c` over the tag's chars, wrapping.
pub fn tag_hash(tag: &str) -> i64 {
    tag.chars()
        .fold(0i64, |hash, c| hash.wrapping_mul(31).wrapping_add(c as i64))
}

/// Group index in `1..=32000`.
pub fn tag_group_index(tag: &str) -> i16 {
    (tag_hash(tag).rem_euclid(GROUP_RANGE) + 1) as i16
}

/// One of bits 1..=15.
pub fn tag_category_bit(tag: &str) -> u16 {
    1u16 << (tag_hash(tag).rem_euclid(CATEGORY_SLOTS) + 1)
}
