//! Feature-match scoring for recommendation candidates.

use crate::domain::product::Product;

use super::normalize::normalize;

/// A full-feature match dominates any partial match.
pub const FULL_MATCH_WEIGHT: f64 = 1_000_000.0;
/// Each additional matched feature outweighs any plausible rating or price
/// spread between candidates.
pub const FEATURE_WEIGHT: f64 = 1_000.0;
/// Rating contributes at most 50 points on the nominal 0-5 scale.
pub const RATING_WEIGHT: f64 = 10.0;
/// Price is a fractional tie-breaking penalty; hard filtering on price
/// already happened in the catalog query.
pub const PRICE_PENALTY_DIVISOR: f64 = 10.0;

/// How well a candidate's feature list covers the requested tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureMatch {
    pub match_count: usize,
    pub all_features_match: bool,
}

/// Count requested tokens present in the candidate's feature list.
///
/// Matching is exact string equality after normalization, not substring;
/// repeated requested tokens each count independently. `requested` must
/// already be normalized ([`crate::recommend::normalize`]).
pub fn match_features(requested: &[String], candidate_features: &[String]) -> FeatureMatch {
    let candidate: Vec<String> = candidate_features.iter().map(|f| normalize(f)).collect();
    let match_count = requested.iter().filter(|token| candidate.contains(token)).count();
    FeatureMatch {
        match_count,
        all_features_match: !requested.is_empty() && match_count == requested.len(),
    }
}

/// Deterministic score, higher is better. Non-finite rating or price reads
/// as zero, mirroring permissive handling of unvalidated catalog data.
pub fn score(product: &Product, feature_match: FeatureMatch) -> f64 {
    let full = if feature_match.all_features_match { 1.0 } else { 0.0 };
    let rating = if product.rating.is_finite() { product.rating } else { 0.0 };
    let price = if product.price.is_finite() { product.price } else { 0.0 };

    full * FULL_MATCH_WEIGHT + feature_match.match_count as f64 * FEATURE_WEIGHT
        + rating * RATING_WEIGHT
        - price / PRICE_PENALTY_DIVISOR
}

#[cfg(test)]
mod tests {
    use crate::domain::product::ProductId;
    use crate::recommend::normalize::normalize;

    use super::*;

    fn candidate(price: f64, rating: f64, features: &[&str]) -> Product {
        Product {
            id: ProductId("p".to_string()),
            name: "candidate".to_string(),
            company: "co".to_string(),
            category: "Laptop".to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
            price,
            rating,
            description: String::new(),
            image: String::new(),
            buy_from: String::new(),
            link: String::new(),
            store_links: None,
        }
    }

    fn requested(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| normalize(t)).collect()
    }

    #[test]
    fn matching_is_exact_equality_after_normalization() {
        let m = match_features(&requested(&[" amoled ", "5g"]), &["AMOLED".into(), "5G".into()]);
        assert_eq!(m.match_count, 2);
        assert!(m.all_features_match);

        // Substring overlap is not a match.
        let m = match_features(&requested(&["5g"]), &["5G ready".into()]);
        assert_eq!(m.match_count, 0);
    }

    #[test]
    fn repeated_requested_tokens_count_independently() {
        let m = match_features(&requested(&["5g", "5g"]), &["5G".into()]);
        assert_eq!(m.match_count, 2);
        assert!(m.all_features_match);
    }

    #[test]
    fn empty_request_never_counts_as_full_match() {
        let m = match_features(&[], &["5G".into()]);
        assert_eq!(m.match_count, 0);
        assert!(!m.all_features_match);
    }

    #[test]
    fn full_feature_match_dominates_rating_and_price_advantage() {
        let wanted = requested(&["5g", "amoled"]);

        // A: cheap, top-rated, but only a partial feature match.
        let a = candidate(500.0, 5.0, &["5G"]);
        // B: expensive, poorly rated, but covers every requested feature.
        let b = candidate(5000.0, 1.0, &["5G", "AMOLED"]);

        let score_a = score(&a, match_features(&wanted, &a.features));
        let score_b = score(&b, match_features(&wanted, &b.features));
        assert!(score_b > score_a);
    }

    #[test]
    fn score_follows_documented_formula() {
        let p = candidate(15000.0, 4.0, &["5G"]);
        let m = match_features(&requested(&["5g", "amoled"]), &p.features);

        // 0 * 1_000_000 + 1 * 1_000 + 4.0 * 10 - 15_000 / 10
        assert_eq!(score(&p, m), 1_000.0 + 40.0 - 1_500.0);
    }

    #[test]
    fn non_finite_rating_and_price_read_as_zero() {
        let p = candidate(f64::NAN, f64::INFINITY, &[]);
        let s = score(&p, FeatureMatch::default());
        assert_eq!(s, 0.0);
    }
}
