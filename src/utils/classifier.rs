#![forbid(unsafe_code)]

use std::fmt;

use crate::utils::errors::Errors;

// ***************************************************************************
//                                Enums
// ***************************************************************************
/// The tags that can appear in a classification's properties list.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Property {
    Armstrong,
    Odd,
    Even,
}

// Convert enum to it's string representation.
impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Property::Armstrong => "armstrong",
            Property::Odd => "odd",
            Property::Even => "even",
        };
        write!(f, "{}", s)
    }
}

// ***************************************************************************
//                              Classification
// ***************************************************************************
/// The mathematical properties of a single number.  The properties list
/// always ends with exactly one parity tag, preceded by armstrong if present.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Classification {
    pub number: i64,
    pub is_prime: bool,
    pub is_perfect: bool,
    pub properties: Vec<Property>,
    pub digit_sum: u32,
}

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// parse_number:
// ---------------------------------------------------------------------------
/** Convert the raw query parameter into a number.  An absent or empty token
 * is distinguished from one that is present but not a valid i64 so that the
 * caller can echo the original input.  Surrounding whitespace is ignored and
 * a single leading sign is accepted.
 */
pub fn parse_number(token: Option<&str>) -> Result<i64, Errors> {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return Err(Errors::NumberMissing),
    };

    token.trim().parse::<i64>().map_err(|_| Errors::NumberInvalid(token.to_string()))
}

// ---------------------------------------------------------------------------
// classify:
// ---------------------------------------------------------------------------
pub fn classify(n: i64) -> Classification {
    let mut properties = Vec::with_capacity(2);
    if is_armstrong(n) {
        properties.push(Property::Armstrong);
    }
    properties.push(parity(n));

    Classification {
        number: n,
        is_prime: is_prime(n),
        is_perfect: is_perfect(n),
        properties,
        digit_sum: digit_sum(n),
    }
}

// ---------------------------------------------------------------------------
// is_prime:
// ---------------------------------------------------------------------------
/** Trial division up to floor(sqrt(n)).  Numbers below 2 are never prime. */
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }

    // n <= i64::MAX so i * i cannot overflow a u64 before the loop ends.
    let n = n as u64;
    let mut i: u64 = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

// ---------------------------------------------------------------------------
// is_perfect:
// ---------------------------------------------------------------------------
/** A perfect number equals the sum of its proper positive divisors.  Divisors
 * are collected in pairs (i, n/i) up to sqrt(n), which yields the same sum as
 * scanning every candidate in [1, n/2].
 */
pub fn is_perfect(n: i64) -> bool {
    if n < 2 {
        // 1 has no proper divisors.
        return false;
    }

    let n = n as u64;
    let mut sum: u64 = 1;
    let mut i: u64 = 2;
    while i * i <= n {
        if n % i == 0 {
            sum += i;
            let pair = n / i;
            if pair != i {
                sum += pair;
            }
            if sum > n {
                return false;
            }
        }
        i += 1;
    }
    sum == n
}

// ---------------------------------------------------------------------------
// is_armstrong:
// ---------------------------------------------------------------------------
/** True when n equals the sum of its decimal digits each raised to the digit
 * count.  Digits come from |n|, so negative numbers never qualify.
 */
pub fn is_armstrong(n: i64) -> bool {
    let digits = digits(n);
    let k = digits.len() as u32;

    // 19 digits of 9^19 overflow an i64 but not a u128.
    let total: u128 = digits.iter().map(|d| (*d as u128).pow(k)).sum();
    n >= 0 && total == n as u128
}

// ---------------------------------------------------------------------------
// digit_sum:
// ---------------------------------------------------------------------------
pub fn digit_sum(n: i64) -> u32 {
    digits(n).iter().sum()
}

// ---------------------------------------------------------------------------
// parity:
// ---------------------------------------------------------------------------
pub fn parity(n: i64) -> Property {
    if n % 2 == 0 {Property::Even} else {Property::Odd}
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// digits:
// ---------------------------------------------------------------------------
/** Base-10 digits of |n|, most significant first.  Zero has one digit. */
fn digits(n: i64) -> Vec<u32> {
    n.unsigned_abs()
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect()
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primes() {
        for n in [2, 3, 5, 7, 11, 97, 7919] {
            assert!(is_prime(n), "{} should be prime", n);
        }
        for n in [0, 1, 4, 9, 15, 7917, -2, -7, i64::MIN] {
            assert!(!is_prime(n), "{} should not be prime", n);
        }
    }

    #[test]
    fn large_prime() {
        // Largest prime below 2^31.
        assert!(is_prime(2_147_483_647));
        assert!(!is_prime(2_147_483_649));
    }

    #[test]
    fn perfect_numbers() {
        for n in [6, 28, 496, 8128, 33_550_336] {
            assert!(is_perfect(n), "{} should be perfect", n);
        }
        for n in [5, 27, 0, 1, 12, 495, -6, -28, i64::MIN] {
            assert!(!is_perfect(n), "{} should not be perfect", n);
        }
    }

    #[test]
    fn perfect_matches_proper_divisor_definition() {
        for n in 1..2000_i64 {
            let expected = (1..=n / 2).filter(|d| n % d == 0).sum::<i64>() == n;
            assert_eq!(is_perfect(n), expected, "mismatch at {}", n);
        }
    }

    #[test]
    fn armstrong_numbers() {
        for n in [0, 1, 9, 153, 370, 371, 407, 9474] {
            assert!(is_armstrong(n), "{} should be armstrong", n);
        }
        for n in [10, 100, 154, 9475, -153, -1] {
            assert!(!is_armstrong(n), "{} should not be armstrong", n);
        }
    }

    #[test]
    fn armstrong_extremes_do_not_overflow() {
        assert!(!is_armstrong(i64::MAX));
        assert!(!is_armstrong(i64::MIN));
        assert!(!is_armstrong(999_999_999_999_999_999));
    }

    #[test]
    fn digit_sums() {
        assert_eq!(digit_sum(-123), 6);
        assert_eq!(digit_sum(0), 0);
        assert_eq!(digit_sum(153), 9);
        assert_eq!(digit_sum(i64::MIN), 89);
    }

    #[test]
    fn parity_of_negatives() {
        assert_eq!(parity(-3), Property::Odd);
        assert_eq!(parity(-4), Property::Even);
        assert_eq!(parity(0), Property::Even);
    }

    #[test]
    fn classify_153() {
        let c = classify(153);
        assert_eq!(c.properties, vec![Property::Armstrong, Property::Odd]);
        assert_eq!(c.digit_sum, 9);
        assert!(!c.is_prime);
        assert!(!c.is_perfect);
    }

    #[test]
    fn classify_28() {
        let c = classify(28);
        assert!(c.is_perfect);
        assert_eq!(c.properties, vec![Property::Even]);
        assert_eq!(c.digit_sum, 10);
    }

    #[test]
    fn properties_hold_one_parity_tag() {
        for n in [-1000, -7, 0, 1, 2, 153, 371, 9474, 10_000] {
            let props = classify(n).properties;
            let parity_tags = props.iter()
                .filter(|p| matches!(p, Property::Odd | Property::Even))
                .count();
            assert_eq!(parity_tags, 1);
            assert!(matches!(props.last(), Some(Property::Odd | Property::Even)));
        }
    }

    #[test]
    fn parse_tokens() {
        assert_eq!(parse_number(Some("42")).unwrap(), 42);
        assert_eq!(parse_number(Some("-17")).unwrap(), -17);
        assert_eq!(parse_number(Some("+5")).unwrap(), 5);
        assert_eq!(parse_number(Some(" 12 ")).unwrap(), 12);
        assert!(matches!(parse_number(None), Err(Errors::NumberMissing)));
        assert!(matches!(parse_number(Some("")), Err(Errors::NumberMissing)));
        match parse_number(Some("abc")) {
            Err(Errors::NumberInvalid(s)) => assert_eq!(s, "abc"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(parse_number(Some("1.5")), Err(Errors::NumberInvalid(_))));
        assert!(matches!(parse_number(Some("99999999999999999999")), Err(Errors::NumberInvalid(_))));
    }
}
