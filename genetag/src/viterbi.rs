//! Exact trigram Viterbi decoding.
//!
//! `pi(k, u, v)` is the probability of the best tag sequence for tokens
//! `0..=k` whose tags at positions `k - 1` and `k` are `u` and `v`. The
//! recurrence seeds at the virtual pair (start, start) before the sentence
//! and is closed by a final transition into the stop pseudo-tag:
//!
//! ```text
//! pi(k, u, v) = max_w pi(k - 1, w, u) * q(v | w, u) * e(x_k | v)
//! ```
//!
//! Probabilities are plain products without smoothing, so a sentence can
//! have no tag sequence of positive probability at all. That case is
//! reported as an empty sequence with probability zero instead of an
//! arbitrary guess.
//!
//! Ties are broken toward the smaller tag id at every choice point. Tag
//! ids follow sort order, so equal-probability alternatives always decode
//! to the same, lexicographically smallest pick per decision.

use crate::tagger::Tagger;
use crate::word_shape;

// backpointer of an unreachable cell
const NO_PREDECESSOR: u32 = u32::MAX;

/// Decodes the most probable tag id sequence for `tokens`.
///
/// Returns the ids and the probability of the whole sequence including the
/// final stop transition, or an empty sequence with probability zero if no
/// viable sequence exists.
pub(crate) fn decode(tagger: &Tagger, tokens: &[String]) -> (Vec<u32>, f64) {
    let n = tokens.len();
    let t = tagger.n_tags();
    if n == 0 || t == 0 {
        return (vec![], 0.0);
    }
    let start = tagger.start as usize;
    // the u axis admits the start pseudo-tag behind the real tags
    let s = t + 1;

    // emission probabilities per position and tag, after rare-word
    // resolution; one lookup per (position, tag) pair
    let mut emissions = vec![0.0; n * t];
    for (k, token) in tokens.iter().enumerate() {
        let resolved = word_shape::resolve(token, tagger.model().counts());
        for v in 0..t {
            emissions[k * t + v] = tagger.emission(resolved, v as u32);
        }
    }

    let cell = |k: usize, u: usize, v: usize| (k * s + u) * t + v;
    let mut pi = vec![0.0; n * s * t];
    let mut bp = vec![NO_PREDECESSOR; n * s * t];

    // k = 0: the only admissible prior pair is (start, start)
    let mut reachable = false;
    for v in 0..t {
        let e = emissions[v];
        if e == 0.0 {
            continue;
        }
        let p = tagger.transition(tagger.start, tagger.start, v as u32) * e;
        if p > 0.0 {
            pi[cell(0, start, v)] = p;
            bp[cell(0, start, v)] = tagger.start;
            reachable = true;
        }
    }
    if !reachable {
        return (vec![], 0.0);
    }

    for k in 1..n {
        // the tag two positions back is pinned to start while the window
        // still overlaps the padding
        let (w_lo, w_hi) = if k == 1 { (start, start + 1) } else { (0, t) };
        reachable = false;
        for v in 0..t {
            let e = emissions[k * t + v];
            if e == 0.0 {
                continue;
            }
            for u in 0..t {
                let mut best = 0.0;
                let mut best_w = NO_PREDECESSOR;
                for w in w_lo..w_hi {
                    let prev = pi[cell(k - 1, w, u)];
                    if prev == 0.0 {
                        continue;
                    }
                    let p = prev * tagger.transition(w as u32, u as u32, v as u32);
                    if p > best {
                        best = p;
                        best_w = w as u32;
                    }
                }
                if best_w != NO_PREDECESSOR {
                    pi[cell(k, u, v)] = best * e;
                    bp[cell(k, u, v)] = best_w;
                    reachable = true;
                }
            }
        }
        if !reachable {
            return (vec![], 0.0);
        }
    }

    // close with the stop transition; the stop pseudo-tag emits nothing
    let (u_lo, u_hi) = if n == 1 { (start, start + 1) } else { (0, t) };
    let mut best = 0.0;
    let mut best_pair = None;
    for u in u_lo..u_hi {
        for v in 0..t {
            let prev = pi[cell(n - 1, u, v)];
            if prev == 0.0 {
                continue;
            }
            let p = prev * tagger.transition(u as u32, v as u32, tagger.stop);
            if p > best {
                best = p;
                best_pair = Some((u, v));
            }
        }
    }
    let (u, v) = match best_pair {
        Some(pair) => pair,
        None => return (vec![], 0.0),
    };

    let mut ids = vec![0; n];
    ids[n - 1] = v as u32;
    if n >= 2 {
        ids[n - 2] = u as u32;
        for k in (2..n).rev() {
            let w = bp[cell(k, ids[k - 1] as usize, ids[k] as usize)];
            debug_assert_ne!(NO_PREDECESSOR, w);
            ids[k - 2] = w;
        }
    }
    (ids, best)
}
