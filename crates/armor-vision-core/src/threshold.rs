//! Global thresholding helpers.

use crate::GrayImage;

/// Otsu threshold of a set of intensities.
///
/// Flat inputs return their single value; inputs with two distinct levels
/// return the midpoint so both levels stay separable.
pub fn otsu_threshold(samples: &[u8]) -> u8 {
    let Some((&first, rest)) = samples.split_first() else {
        return 127;
    };

    let mut hist = [0u32; 256];
    let (mut min_v, mut max_v) = (first, first);
    hist[first as usize] += 1;
    for &v in rest {
        hist[v as usize] += 1;
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v == max_v {
        return min_v;
    }
    if hist.iter().filter(|&&h| h > 0).count() <= 2 {
        return ((min_v as u16 + max_v as u16) / 2) as u8;
    }

    let total = samples.len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 127u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Binarize in place: pixels strictly above the Otsu level become 255.
pub fn binarize_otsu(img: &mut GrayImage) -> u8 {
    let t = otsu_threshold(&img.data);
    for v in &mut img.data {
        *v = if *v > t { 255 } else { 0 };
    }
    t
}
