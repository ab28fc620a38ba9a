//! Cosine similarity over stored f16 reference vectors.

use half::f16;

#[inline]
pub fn cosine_similarity_f16_f32(a: &[f16], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0f32;
    let mut norm_a_sq = 0.0f32;
    let mut norm_b_sq = 0.0f32;

    for (av_f16, &bv) in a.iter().zip(b.iter()) {
        let av = av_f16.to_f32();
        dot_product += av * bv;
        norm_a_sq += av * av;
        norm_b_sq += bv * bv;
    }

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Index and raw cosine of the best reference vector.
///
/// Linear scan in corpus order; a later vector wins only with a strictly
/// greater score, and NaN scores never win. Returns `None` when no vector
/// produced a comparable score.
pub fn best_match<'a, I>(query: &[f32], vectors: I) -> Option<(usize, f32)>
where
    I: IntoIterator<Item = &'a [f16]>,
{
    let mut best: Option<(usize, f32)> = None;

    for (idx, vector) in vectors.into_iter().enumerate() {
        let score = cosine_similarity_f16_f32(vector, query);
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }

    best
}

/// Maps a cosine in `[-1, 1]` onto `[0, 1]`.
#[inline]
pub fn rescale_similarity(raw: f32) -> f32 {
    ((raw + 1.0) / 2.0).clamp(0.0, 1.0)
}

pub fn f32_to_f16_vec(values: &[f32]) -> Vec<f16> {
    values.iter().map(|&v| f16::from_f32(v)).collect()
}

#[inline]
pub fn f16_slice_to_bytes(values: &[f16]) -> &[u8] {
    bytemuck::cast_slice(values)
}

/// Copies little-endian f16 bytes into an owned, aligned vector.
///
/// Returns `None` if the byte length is odd.
pub fn bytes_to_f16_vec(bytes: &[u8]) -> Option<Vec<f16>> {
    if !bytes.len().is_multiple_of(std::mem::size_of::<f16>()) {
        return None;
    }
    Some(bytemuck::pod_collect_to_vec(bytes))
}
