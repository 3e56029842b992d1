use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Hand categories, lowest first so the derived ordering matches strength.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandRank {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandRank {
    /// 1 for high card up to 10 for a royal flush.
    pub fn value(self) -> u8 {
        self as u8 + 1
    }
}

/// Outcome of evaluating one player's cards.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub rank: HandRank,
    /// 1..=10, or 0 for the incomplete sentinel
    pub rank_value: u8,
    /// Tie-break key, compared element by element
    pub high_cards: Vec<u8>,
    pub description: String,
}

impl HandResult {
    fn new(rank: HandRank, high_cards: Vec<u8>, description: String) -> Self {
        Self {
            rank,
            rank_value: rank.value(),
            high_cards,
            description,
        }
    }

    /// Returned when fewer than five cards are available. Loses to every real hand.
    pub fn incomplete() -> Self {
        Self {
            rank: HandRank::HighCard,
            rank_value: 0,
            high_cards: Vec::new(),
            description: "Not enough cards".to_string(),
        }
    }

    pub fn is_incomplete(&self) -> bool {
        self.rank_value == 0
    }
}

/// Best five-card hand from hole + community cards.
///
/// Every 5-card subset of the union (at most C(7,5) = 21) is scored and the
/// maximum under [`compare_hands`] is kept.
pub fn evaluate_hand(hole_cards: &[Card], community_cards: &[Card]) -> HandResult {
    let cards: Vec<Card> = hole_cards
        .iter()
        .chain(community_cards.iter())
        .copied()
        .collect();
    if cards.len() < 5 {
        return HandResult::incomplete();
    }

    let mut best: Option<HandResult> = None;
    for combo in five_card_subsets(&cards) {
        let result = evaluate_five(&combo);
        let better = match &best {
            Some(current) => compare_hands(&result, current).is_gt(),
            None => true,
        };
        if better {
            best = Some(result);
        }
    }
    best.unwrap_or_else(HandResult::incomplete)
}

fn five_card_subsets(cards: &[Card]) -> Vec<[Card; 5]> {
    let n = cards.len();
    let mut out = Vec::new();
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        out.push([cards[a], cards[b], cards[c], cards[d], cards[e]]);
                    }
                }
            }
        }
    }
    out
}

/// Scores exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> HandResult {
    let mut values: Vec<u8> = cards.iter().map(Card::rank_value).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = straight_high(&values);

    // (value, count) sorted by count then value, both descending
    let mut groups: Vec<(u8, usize)> = Vec::with_capacity(5);
    for &v in &values {
        match groups.iter_mut().find(|(value, _)| *value == v) {
            Some((_, count)) => *count += 1,
            None => groups.push((v, 1)),
        }
    }
    groups.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    let (top, top_count) = groups[0];
    let second = groups.get(1).copied();
    let kickers = |exclude: &[u8], take: usize| -> Vec<u8> {
        values
            .iter()
            .copied()
            .filter(|v| !exclude.contains(v))
            .take(take)
            .collect()
    };

    if let (true, Some(14)) = (is_flush, straight_high) {
        return HandResult::new(HandRank::RoyalFlush, vec![14], "Royal Flush".to_string());
    }
    if let (true, Some(high)) = (is_flush, straight_high) {
        return HandResult::new(
            HandRank::StraightFlush,
            vec![high],
            format!("Straight Flush, {} high", rank_name(high)),
        );
    }
    if top_count == 4 {
        let kicker = second.map(|(v, _)| v).unwrap_or(0);
        return HandResult::new(
            HandRank::FourOfAKind,
            vec![top, kicker],
            format!("Four of a Kind, {}s", rank_name(top)),
        );
    }
    if let (3, Some((pair, 2))) = (top_count, second) {
        return HandResult::new(
            HandRank::FullHouse,
            vec![top, pair],
            format!(
                "Full House, {}s full of {}s",
                rank_name(top),
                rank_name(pair)
            ),
        );
    }
    if is_flush {
        return HandResult::new(
            HandRank::Flush,
            values.clone(),
            format!("Flush, {} high", rank_name(values[0])),
        );
    }
    if let Some(high) = straight_high {
        return HandResult::new(
            HandRank::Straight,
            vec![high],
            format!("Straight, {} high", rank_name(high)),
        );
    }
    if top_count == 3 {
        let mut key = vec![top];
        key.extend(kickers(&[top], 2));
        return HandResult::new(
            HandRank::ThreeOfAKind,
            key,
            format!("Three of a Kind, {}s", rank_name(top)),
        );
    }
    if let (2, Some((low, 2))) = (top_count, second) {
        let mut key = vec![top, low];
        key.extend(kickers(&[top, low], 1));
        return HandResult::new(
            HandRank::TwoPair,
            key,
            format!("Two Pair, {}s and {}s", rank_name(top), rank_name(low)),
        );
    }
    if top_count == 2 {
        let mut key = vec![top];
        key.extend(kickers(&[top], 3));
        return HandResult::new(HandRank::Pair, key, format!("Pair of {}s", rank_name(top)));
    }
    HandResult::new(
        HandRank::HighCard,
        values.clone(),
        format!("High Card, {}", rank_name(values[0])),
    )
}

/// High card of a straight among `values` (sorted descending), if any.
/// The wheel A-2-3-4-5 reports 5.
fn straight_high(values: &[u8]) -> Option<u8> {
    let mut unique = values.to_vec();
    unique.dedup();
    if unique.len() < 5 {
        return None;
    }
    if let Some(window) = unique.windows(5).find(|w| w[0] - w[4] == 4) {
        return Some(window[0]);
    }
    let wheel = [14, 5, 4, 3, 2];
    if wheel.iter().all(|v| unique.contains(v)) {
        return Some(5);
    }
    None
}

/// Orders by category, then tie-break key; missing trailing entries count as 0.
pub fn compare_hands(a: &HandResult, b: &HandResult) -> Ordering {
    match a.rank_value.cmp(&b.rank_value) {
        Ordering::Equal => {}
        ord => return ord,
    }
    let len = a.high_cards.len().max(b.high_cards.len());
    for i in 0..len {
        let left = a.high_cards.get(i).copied().unwrap_or(0);
        let right = b.high_cards.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

fn rank_name(value: u8) -> String {
    match value {
        14 => "Ace".to_string(),
        13 => "King".to_string(),
        12 => "Queen".to_string(),
        11 => "Jack".to_string(),
        v => v.to_string(),
    }
}
