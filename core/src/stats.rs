//! Stat blocks, property values and the modifier algebra applied to towers.
//!
//! A tower's effective [`Properties`] are derived from its base block and an
//! [`Enhancement`] accumulator. The accumulator only ever sums modifier
//! fields; the order-sensitive part lives in [`Properties::enhanced`], which
//! applies flat damage first, percentage enhancement to the post-flat value
//! second, and the scalar speed/range/crit adjustments last.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of distinct damage types tracked by a [`DamageTable`].
pub const DAMAGE_TYPE_COUNT: usize = 4;

/// Elemental category carried by a damage roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageType {
    /// Kinetic damage dealt by arrows and bolts.
    Physical,
    /// Burning damage.
    Fire,
    /// Freezing damage.
    Frost,
    /// Arcing electrical damage.
    Lightning,
}

impl DamageType {
    /// Every damage type in table order.
    pub const ALL: [DamageType; DAMAGE_TYPE_COUNT] = [
        DamageType::Physical,
        DamageType::Fire,
        DamageType::Frost,
        DamageType::Lightning,
    ];

    /// Position of the damage type within a [`DamageTable`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Physical => 0,
            Self::Fire => 1,
            Self::Frost => 2,
            Self::Lightning => 3,
        }
    }
}

/// Defensive category of a monster's armor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorKind {
    /// No protection.
    Unarmored,
    /// Leather and hide.
    Light,
    /// Plate and scale.
    Heavy,
    /// Stone-like hides that shrug off most attacks.
    Fortified,
}

/// Armor worn by a monster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    /// Category used to look up damage coefficients.
    pub kind: ArmorKind,
    /// Flat damage absorbed from every hit.
    pub amount: f32,
}

impl Armor {
    /// Creates an armor description.
    #[must_use]
    pub const fn new(kind: ArmorKind, amount: f32) -> Self {
        Self { kind, amount }
    }

    /// Armor that neither scales nor absorbs damage.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(ArmorKind::Unarmored, 0.0)
    }
}

/// Half-open `[low, high)` interval a damage roll is drawn from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageRange {
    low: f32,
    high: f32,
}

impl DamageRange {
    /// Creates a damage range. Bounds are swapped when given in reverse.
    #[must_use]
    pub fn new(low: f32, high: f32) -> Self {
        if high < low {
            Self {
                low: high,
                high: low,
            }
        } else {
            Self { low, high }
        }
    }

    /// Range that always yields exactly `value`.
    #[must_use]
    pub const fn fixed(value: f32) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    /// Inclusive lower bound of the range.
    #[must_use]
    pub const fn low(&self) -> f32 {
        self.low
    }

    /// Exclusive upper bound of the range.
    #[must_use]
    pub const fn high(&self) -> f32 {
        self.high
    }

    /// Reports whether the range contributes no damage at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.low <= 0.0 && self.high <= 0.0
    }

    /// Reports whether the range cannot be rolled: empty, or with a
    /// non-finite bound.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.low.is_finite() && self.high.is_finite()) || self.high <= self.low
    }

    fn offset(self, amount: f32) -> Self {
        Self::new(self.low + amount, self.high + amount)
    }

    fn scale(self, factor: f32) -> Self {
        Self::new(self.low * factor, self.high * factor)
    }
}

/// Damage ranges indexed by [`DamageType`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageTable {
    ranges: [DamageRange; DAMAGE_TYPE_COUNT],
}

impl DamageTable {
    /// Table with a single damage type populated.
    #[must_use]
    pub fn single(kind: DamageType, range: DamageRange) -> Self {
        let mut table = Self::default();
        table.set(kind, range);
        table
    }

    /// Range associated with the damage type.
    #[must_use]
    pub const fn get(&self, kind: DamageType) -> DamageRange {
        self.ranges[kind.index()]
    }

    /// Replaces the range associated with the damage type.
    pub fn set(&mut self, kind: DamageType, range: DamageRange) {
        self.ranges[kind.index()] = range;
    }

    /// Iterates the populated damage types in table order.
    pub fn iter(&self) -> impl Iterator<Item = (DamageType, DamageRange)> + '_ {
        DamageType::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, range)| !range.is_zero())
    }
}

/// Secondary behaviour carried by an attack or triggered by a kill.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Multiplies the victim's speed by `factor` for `duration`.
    Slow {
        /// Speed multiplier in `0.0..=1.0`.
        factor: f32,
        /// How long the slow persists.
        duration: Duration,
    },
    /// Extra damage that weakens by `decay` every time it lands.
    DecayingDamage {
        /// Element of the extra damage.
        kind: DamageType,
        /// Current extra damage per hit.
        amount: f32,
        /// Amount subtracted from `amount` after each hit.
        decay: f32,
    },
    /// Damages every other monster sharing the victim's tile on death.
    Burst {
        /// Element of the burst.
        kind: DamageType,
        /// Raw burst damage before coefficients.
        amount: f32,
    },
}

/// Effective combat statistics of a tower, or the snapshot carried by an attack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    /// Damage ranges per element.
    pub damage: DamageTable,
    /// Attacks fired per second.
    pub attack_speed: f32,
    /// Targeting radius measured in normalized map units.
    pub range: f32,
    /// Probability in `0.0..=1.0` that a hit is critical.
    pub crit_chance: f32,
    /// Damage multiplier applied to critical hits.
    pub crit_multiplier: f32,
    /// Effects applied to the victim of every hit.
    pub on_hit: Vec<Effect>,
    /// Effects triggered when a hit kills its victim.
    pub on_death: Vec<Effect>,
}

impl Properties {
    /// Applies the enhancement accumulator to the base properties.
    ///
    /// Flat damage is added before percentage enhancement is applied, so a
    /// base value `V` with a flat `D` and an enhancement `P` resolves to
    /// `(V + D) * (1 + P)`. Speed, range and crit adjustments follow.
    #[must_use]
    pub fn enhanced(&self, enhancement: &Enhancement) -> Properties {
        let mut damage = self.damage;
        for kind in DamageType::ALL {
            let base = damage.get(kind);
            let mut flat = enhancement.flat_damage[kind.index()];
            if !base.is_zero() {
                flat += enhancement.flat_all;
            }
            let with_flat = if flat == 0.0 { base } else { base.offset(flat) };
            let percent = enhancement.enhanced_all + enhancement.enhanced_damage[kind.index()];
            let scaled = if percent == 0.0 {
                with_flat
            } else {
                with_flat.scale(1.0 + percent)
            };
            damage.set(kind, scaled);
        }

        let mut on_hit = self.on_hit.clone();
        on_hit.extend(enhancement.on_hit.iter().copied());

        Properties {
            damage,
            attack_speed: self.attack_speed * (1.0 + enhancement.enhanced_speed),
            range: self.range + enhancement.flat_range,
            crit_chance: (self.crit_chance + enhancement.crit_chance).clamp(0.0, 1.0),
            crit_multiplier: self.crit_multiplier + enhancement.crit_multiplier,
            on_hit,
            on_death: self.on_death.clone(),
        }
    }
}

/// Closed set of tower stat modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatModifier {
    /// Adds a flat amount to every damage type the tower already deals.
    FlatDamage(f32),
    /// Enhances every damage type by a fraction (`0.25` is +25%).
    EnhancedDamage(f32),
    /// Enhances attack speed by a fraction.
    EnhancedSpeed(f32),
    /// Adds to the targeting radius.
    FlatRange(f32),
    /// Adds to the critical hit probability.
    CritChance(f32),
    /// Adds to the critical hit multiplier.
    CritMultiplier(f32),
    /// Adds a flat amount to one damage type.
    TypedDamage {
        /// Damage type receiving the bonus.
        kind: DamageType,
        /// Flat bonus.
        amount: f32,
    },
    /// Enhances one damage type by a fraction.
    TypedEnhancedDamage {
        /// Damage type receiving the bonus.
        kind: DamageType,
        /// Fractional bonus.
        percent: f32,
    },
    /// Grants on-hit damage that decays every time it lands.
    DecayingDamage {
        /// Damage type of the extra damage.
        kind: DamageType,
        /// Initial extra damage.
        amount: f32,
        /// Per-hit decay.
        decay: f32,
    },
}

/// Accumulated sum of every modifier applied to a tower.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Enhancement {
    flat_all: f32,
    flat_damage: [f32; DAMAGE_TYPE_COUNT],
    enhanced_all: f32,
    enhanced_damage: [f32; DAMAGE_TYPE_COUNT],
    enhanced_speed: f32,
    flat_range: f32,
    crit_chance: f32,
    crit_multiplier: f32,
    on_hit: Vec<Effect>,
}

impl Enhancement {
    /// Creates an empty accumulator, the identity of [`Properties::enhanced`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a sequence of modifiers.
    #[must_use]
    pub fn from_modifiers(modifiers: impl IntoIterator<Item = StatModifier>) -> Self {
        let mut enhancement = Self::new();
        for modifier in modifiers {
            enhancement.apply(modifier);
        }
        enhancement
    }

    /// Folds a single modifier into the accumulator.
    pub fn apply(&mut self, modifier: StatModifier) {
        match modifier {
            StatModifier::FlatDamage(amount) => self.flat_all += amount,
            StatModifier::EnhancedDamage(percent) => self.enhanced_all += percent,
            StatModifier::EnhancedSpeed(percent) => self.enhanced_speed += percent,
            StatModifier::FlatRange(amount) => self.flat_range += amount,
            StatModifier::CritChance(amount) => self.crit_chance += amount,
            StatModifier::CritMultiplier(amount) => self.crit_multiplier += amount,
            StatModifier::TypedDamage { kind, amount } => {
                self.flat_damage[kind.index()] += amount;
            }
            StatModifier::TypedEnhancedDamage { kind, percent } => {
                self.enhanced_damage[kind.index()] += percent;
            }
            StatModifier::DecayingDamage {
                kind,
                amount,
                decay,
            } => self.on_hit.push(Effect::DecayingDamage {
                kind,
                amount,
                decay,
            }),
        }
    }

    /// Reports whether every accumulated value is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        let scalars = [
            self.flat_all,
            self.enhanced_all,
            self.enhanced_speed,
            self.flat_range,
            self.crit_chance,
            self.crit_multiplier,
        ];
        scalars
            .iter()
            .chain(&self.flat_damage)
            .chain(&self.enhanced_damage)
            .all(|value| value.is_finite())
            && self.on_hit.iter().all(|effect| match *effect {
                Effect::Slow { factor, .. } => factor.is_finite(),
                Effect::DecayingDamage { amount, decay, .. } => {
                    amount.is_finite() && decay.is_finite()
                }
                Effect::Burst { amount, .. } => amount.is_finite(),
            })
    }

    /// Folds another accumulator into this one.
    pub fn merge(&mut self, other: &Enhancement) {
        self.flat_all += other.flat_all;
        self.enhanced_all += other.enhanced_all;
        for index in 0..DAMAGE_TYPE_COUNT {
            self.flat_damage[index] += other.flat_damage[index];
            self.enhanced_damage[index] += other.enhanced_damage[index];
        }
        self.enhanced_speed += other.enhanced_speed;
        self.flat_range += other.flat_range;
        self.crit_chance += other.crit_chance;
        self.crit_multiplier += other.crit_multiplier;
        self.on_hit.extend(other.on_hit.iter().copied());
    }

    /// Weakens every decaying on-hit effect by its decay, dropping spent ones.
    pub fn decay_on_hit(&mut self) {
        self.on_hit.retain_mut(|effect| match effect {
            Effect::DecayingDamage { amount, decay, .. } => {
                *amount = (*amount - *decay).max(0.0);
                *amount > 0.0
            }
            _ => true,
        });
    }
}
