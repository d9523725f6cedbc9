/// Linear interpolation resampler for interleaved samples.
///
/// Good enough for a short sound effect; only used when the output device
/// refuses to run at the file's native rate.
pub fn resample_linear(samples: &[f32], channels: usize, from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || channels == 0 {
        return samples.to_vec();
    }

    let frames = samples.len() / channels;
    let ratio = from_rate as f64 / to_rate as f64;
    let new_frames = (frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let mut output = Vec::with_capacity(new_frames * channels);

    for i in 0..new_frames {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        for c in 0..channels {
            let s1 = samples.get(src_idx * channels + c).copied().unwrap_or(0.0);
            let s2 = samples
                .get((src_idx + 1) * channels + c)
                .copied()
                .unwrap_or(s1);
            output.push(s1 * (1.0 - frac) + s2 * frac);
        }
    }

    output
}
