use thiserror::Error;

/// How far a [`ScapegoatTree`](crate::ScapegoatTree) may drift from perfect balance before it
/// rebuilds part of itself.
///
/// The factor `beta` ranges over `0..=1000`. It maps to the weight-balance fraction
/// `alpha = (beta + 1000) / 2000`, so `0` is the strictest setting (frequent rebuilds, shallow
/// tree, fastest lookups) and `1000` disables insertion-triggered rebuilding altogether.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::BalanceFactor;
///
/// let strict = BalanceFactor::STRICT;
/// assert_eq!(strict.get(), 0);
/// assert_eq!(strict.depth_limit(8), 3);
///
/// assert!(BalanceFactor::try_from(1001).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BalanceFactor {
    beta: u16,
    // log2(1 / alpha), fixed at construction.
    log2_ratio: f64,
}

/// The error returned when converting an out-of-range integer into a [`BalanceFactor`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("balance factor {0} is out of range (0..={max})", max = BalanceFactor::MAX)]
pub struct BalanceFactorError(pub u16);

impl BalanceFactor {
    /// The largest accepted `beta`.
    pub const MAX: u16 = 1000;

    /// Strictest balance: `beta = 0`.
    pub const STRICT: Self = Self::new(0);

    /// The general-purpose default: `beta = 500`.
    pub const DEFAULT: Self = Self::new(500);

    /// Creates a balance factor.
    ///
    /// # Panics
    ///
    /// Panics if `beta > BalanceFactor::MAX`.
    #[must_use]
    pub const fn new(beta: u16) -> Self {
        assert!(beta <= Self::MAX, "`BalanceFactor::new()` - `beta` > `BalanceFactor::MAX`!");
        let ratio = 2000.0 / (beta as f64 + 1000.0);
        Self {
            beta,
            log2_ratio: log2(ratio),
        }
    }

    /// Returns `beta`.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.beta
    }

    /// Returns the deepest tolerated depth (in edges from the subtree root) for a subtree of
    /// `len` elements.
    ///
    /// This is `floor(log(len) / log(1 / alpha))`, `0` for `len < 2`, and [`usize::MAX`] when
    /// `beta` is [`BalanceFactor::MAX`], so offsets from it should use saturating arithmetic.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::BalanceFactor;
    ///
    /// assert_eq!(BalanceFactor::STRICT.depth_limit(1), 0);
    /// assert_eq!(BalanceFactor::STRICT.depth_limit(3), 1);
    /// assert_eq!(BalanceFactor::STRICT.depth_limit(4), 2);
    /// assert_eq!(BalanceFactor::new(1000).depth_limit(4), usize::MAX);
    /// ```
    #[must_use]
    pub fn depth_limit(self, len: usize) -> usize {
        if self.beta == Self::MAX {
            return usize::MAX;
        }
        if len < 2 {
            return 0;
        }
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let limit = (log2(len as f64) / self.log2_ratio) as usize;
        limit
    }

    /// Returns true if a tree that has shrunk from `max` to `len` elements should be rebuilt
    /// from its root.
    ///
    /// Deletions never create a local imbalance that a single ancestor can be blamed for, so
    /// the whole tree is rebuilt once either:
    ///
    /// - `len` falls below `max * (1 - alpha / 2)`, which is half of `max` at
    ///   [`BalanceFactor::MAX`] and three quarters of it at [`BalanceFactor::STRICT`];
    /// - the depth `max` allowed exceeds the depth `len` allows by more than one level.
    ///
    /// The first condition needs at least `max / 4` deletions since the last rebuild. The
    /// second keeps the height within one level of [`depth_limit`](Self::depth_limit).
    pub(crate) fn should_shrink(self, len: usize, max: usize) -> bool {
        // 1 - alpha / 2 = (3000 - beta) / 4000
        let below_fraction = (len as u128) * 4000 < (max as u128) * u128::from(3000 - self.beta);
        below_fraction || self.depth_limit(max) > self.depth_limit(len).saturating_add(1)
    }
}

impl Default for BalanceFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u16> for BalanceFactor {
    type Error = BalanceFactorError;

    fn try_from(beta: u16) -> Result<Self, Self::Error> {
        if beta > Self::MAX {
            return Err(BalanceFactorError(beta));
        }
        Ok(Self::new(beta))
    }
}

impl From<BalanceFactor> for u16 {
    fn from(balance: BalanceFactor) -> Self {
        balance.beta
    }
}

/// Base-2 logarithm of a finite `x >= 1.0`, using only `core` float arithmetic.
///
/// The exponent comes straight from the bit pattern; the mantissa's logarithm is produced one
/// bit at a time by repeated squaring. Powers of two are exact.
const fn log2(x: f64) -> f64 {
    const MANTISSA_MASK: u64 = 0x000f_ffff_ffff_ffff;
    const ONE_EXPONENT: u64 = 0x3ff0_0000_0000_0000;

    let bits = x.to_bits();
    #[allow(clippy::cast_possible_wrap)]
    let exponent = ((bits >> 52) & 0x7ff) as i64 - 1023;
    let mut mantissa = f64::from_bits((bits & MANTISSA_MASK) | ONE_EXPONENT);
    #[allow(clippy::cast_precision_loss)]
    let mut result = exponent as f64;
    let mut bit = 0.5;
    let mut i = 0;
    while i < 52 {
        mantissa *= mantissa;
        if mantissa >= 2.0 {
            mantissa *= 0.5;
            result += bit;
        }
        bit *= 0.5;
        i += 1;
    }
    result
}
