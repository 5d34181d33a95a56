use crate::{Error, Result};

use fnv::FnvHashMap;
use rand::Rng;
use std::cmp;
use std::fmt::Write as _;
use std::str::FromStr;

#[cfg(feature = "serialize")]
use serde::Serialize;

/// A validated bin-packing instance: a bin capacity and the multiset of item lengths to pack.
///
/// Every item is known to fit in an empty bin, so constructing an `Instance` is where
/// infeasible input gets rejected.
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    capacity: usize,
    items: Vec<usize>,
}

impl Instance {
    /// Creates an instance, rejecting a zero capacity and any item that is zero length or
    /// longer than `capacity`. An instance with no items is valid.
    pub fn new(capacity: usize, items: Vec<usize>) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }

        for &length in &items {
            if length == 0 {
                return Err(Error::ZeroLengthItem);
            }
            if length > capacity {
                return Err(Error::InfeasibleItem { length, capacity });
            }
        }

        Ok(Self { capacity, items })
    }

    /// Parses the text instance format:
    ///
    /// ```text
    /// L= <capacity>
    /// m= <number of item types>
    /// <length> <demand>
    /// ...
    /// ```
    ///
    /// Each item type line expands into `demand` items. Lengths written as decimals are
    /// truncated. Item lines with fewer than two fields are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();

        let capacity = header_value(lines.next(), 1)?;
        if capacity <= 0 {
            return Err(Error::InvalidCapacity);
        }
        let num_types = header_value(lines.next(), 2)?;
        let num_types = usize::try_from(num_types)
            .map_err(|_| parse_error(2, "number of item types is negative"))?;

        let mut items = Vec::new();
        for i in 0..num_types {
            let line_number = i + 3;
            let line = lines.next().ok_or_else(|| {
                parse_error(
                    line_number,
                    format!("expected {} item lines, found {}", num_types, i),
                )
            })?;

            let mut fields = line.split_whitespace();
            let (length, demand) = match (fields.next(), fields.next()) {
                (Some(length), Some(demand)) => (length, demand),
                _ => continue,
            };

            let length = length
                .parse::<f64>()
                .ok()
                .filter(|l| l.is_finite() && *l >= 0.0)
                .ok_or_else(|| parse_error(line_number, format!("invalid length `{}`", length)))?
                .trunc() as usize;
            let demand = demand
                .parse::<usize>()
                .map_err(|_| parse_error(line_number, format!("invalid demand `{}`", demand)))?;

            if !push_copies(&mut items, length, demand) {
                return Err(parse_error(
                    line_number,
                    format!("demand `{}` is too large", demand),
                ));
            }
        }

        Self::new(capacity as usize, items)
    }

    /// Generates a random instance with `num_types` item types. Lengths are drawn uniformly
    /// from `min_length..=min(max_length, capacity)` and demands from `1..=max_demand`.
    pub fn random<R>(
        capacity: usize,
        num_types: usize,
        min_length: usize,
        max_length: usize,
        max_demand: usize,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        if min_length == 0 {
            return Err(Error::ZeroLengthItem);
        }
        if min_length > capacity {
            return Err(Error::InfeasibleItem {
                length: min_length,
                capacity,
            });
        }
        let max_length = cmp::min(max_length, capacity);
        if min_length > max_length {
            return Err(Error::InvalidLengthRange {
                min_length,
                max_length,
            });
        }

        let mut items = Vec::new();
        for _ in 0..num_types {
            let length = rng.gen_range(min_length..=max_length);
            let demand = rng.gen_range(1..=cmp::max(1, max_demand));
            if !push_copies(&mut items, length, demand) {
                return Err(Error::TooManyItems);
            }
        }

        Self::new(capacity, items)
    }

    /// Writes this instance in the text format read by [`Instance::parse`], one line per
    /// distinct length, longest first.
    pub fn to_text(&self) -> String {
        let mut demands: Vec<(usize, usize)> = self.item_counts().into_iter().collect();
        demands.sort_unstable_by_key(|&(length, _)| cmp::Reverse(length));

        let mut text = String::new();
        let _ = writeln!(text, "L= {}", self.capacity);
        let _ = writeln!(text, "m= {}", demands.len());
        for (length, demand) in demands {
            let _ = writeln!(text, "{} {}", length, demand);
        }
        text
    }

    /// Bin capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Item lengths in input order.
    pub fn items(&self) -> &[usize] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items to pack.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item lengths.
    pub fn total_length(&self) -> usize {
        self.items.iter().sum()
    }

    /// The trivial lower bound on bins used: total length divided by capacity, rounded up.
    pub fn lower_bound(&self) -> usize {
        bins_lower_bound(self.capacity, self.total_length())
    }

    /// Multiset view of the items: length mapped to number of occurrences.
    pub fn item_counts(&self) -> FnvHashMap<usize, usize> {
        let mut counts = FnvHashMap::default();
        for &item in &self.items {
            *counts.entry(item).or_insert(0) += 1;
        }
        counts
    }
}

impl FromStr for Instance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Appends `count` copies of `length`, or returns `false` without touching `items` if that
/// many can't be allocated.
pub(crate) fn push_copies(items: &mut Vec<usize>, length: usize, count: usize) -> bool {
    if items.try_reserve(count).is_err() {
        return false;
    }
    items.extend(std::iter::repeat(length).take(count));
    true
}

pub(crate) fn bins_lower_bound(capacity: usize, total_length: usize) -> usize {
    if capacity == 0 {
        0
    } else {
        (total_length + capacity - 1) / capacity
    }
}

fn header_value(line: Option<&str>, line_number: usize) -> Result<i64> {
    let line = line.ok_or_else(|| parse_error(line_number, "unexpected end of input"))?;
    let value = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| parse_error(line_number, "missing value"))?;

    value
        .parse::<i64>()
        .map_err(|_| parse_error(line_number, format!("invalid value `{}`", value)))
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}
