use super::traits::AnnotationFile;
use crate::core::models::annotation::{
    AnnotationError, AnnotationSet, ChainAnnotation, Interaction, InteractionKind, PairClass,
};
use crate::core::models::sequence::Sequence;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

const OPENING: [char; 4] = ['(', '[', '{', '<'];
const CLOSING: [char; 4] = [')', ']', '}', '>'];
const CHAIN_BREAK: char = '&';
const UNPAIRED: char = '.';

/// Reader for dot-bracket annotations, one frame per non-comment line.
pub struct DotBracketFile;

struct ParsedFrame {
    pairs: Vec<(usize, usize, usize)>,
    chain_of: Vec<usize>,
    n_chains: usize,
}

fn parse_frame(
    token: &str,
    expected_len: usize,
    line: usize,
) -> Result<ParsedFrame, AnnotationError> {
    let mut stacks: [Vec<usize>; 4] = Default::default();
    let mut pairs = Vec::new();
    let mut chain_of = Vec::with_capacity(expected_len);
    let mut chain = 0;

    for c in token.chars() {
        if c == CHAIN_BREAK {
            chain += 1;
            continue;
        }
        let idx = chain_of.len();
        if let Some(kind) = OPENING.iter().position(|&o| o == c) {
            stacks[kind].push(idx);
        } else if let Some(kind) = CLOSING.iter().position(|&o| o == c) {
            let open = stacks[kind].pop().ok_or_else(|| AnnotationError::Parse {
                line,
                message: format!("unmatched '{}' at position {}", c, idx),
            })?;
            pairs.push((open, idx, kind));
        } else if c != UNPAIRED {
            return Err(AnnotationError::Parse {
                line,
                message: format!("unexpected character '{}'", c),
            });
        }
        chain_of.push(chain);
    }

    if let Some(kind) = stacks.iter().position(|s| !s.is_empty()) {
        return Err(AnnotationError::Parse {
            line,
            message: format!("unmatched '{}'", OPENING[kind]),
        });
    }
    if chain_of.len() != expected_len {
        return Err(AnnotationError::LengthMismatch {
            expected: expected_len,
            found: chain_of.len(),
        });
    }

    pairs.sort_unstable();
    Ok(ParsedFrame {
        pairs,
        chain_of,
        n_chains: chain + 1,
    })
}

impl AnnotationFile for DotBracketFile {
    fn read_from(
        reader: &mut impl BufRead,
        sequence: &Sequence,
    ) -> Result<AnnotationSet, AnnotationError> {
        let mut frames = Vec::new();
        for (line_idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(token) = trimmed.split_whitespace().last() {
                frames.push(parse_frame(token, sequence.len(), line_idx + 1)?);
            }
        }

        let Some(first) = frames.first() else {
            return Err(AnnotationError::Empty);
        };
        let n_chains = first.n_chains;
        if frames.iter().any(|f| f.n_chains != n_chains) {
            return Err(AnnotationError::Parse {
                line: 0,
                message: "frames disagree on the number of chains".to_string(),
            });
        }

        let mut order: Vec<(usize, usize, usize)> = Vec::new();
        let mut counts: HashMap<(usize, usize, usize), (usize, usize)> = HashMap::new();
        for frame in &frames {
            for &(i, j, kind) in &frame.pairs {
                let entry = counts.entry((i, j, kind)).or_insert_with(|| {
                    order.push((i, j, kind));
                    (frame.chain_of[i], 0)
                });
                entry.1 += 1;
            }
        }

        let n_frames = frames.len();
        let mut chains: Vec<ChainAnnotation> = (0..n_chains)
            .map(|c| ChainAnnotation::new(c.to_string()))
            .collect();
        for key in order {
            let (chain, count) = counts[&key];
            let (i, j, kind) = key;
            let code: String = [OPENING[kind], CLOSING[kind]].iter().collect();
            chains[chain].insert(
                Interaction::with_kind(i, j, InteractionKind::Pair(PairClass::Canonical), &code)
                    .with_frequency(count as f64 / n_frames as f64),
            );
        }

        debug!(
            frames = n_frames,
            chains = n_chains,
            "Parsed dot-bracket annotation."
        );
        Ok(AnnotationSet::new(chains, n_frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(content: &str, seq: &str) -> Result<AnnotationSet, AnnotationError> {
        let sequence = Sequence::new(seq, 1, &[]).unwrap();
        DotBracketFile::read_from(&mut Cursor::new(content), &sequence)
    }

    #[test]
    fn hairpin_yields_nested_pairs() {
        let set = read("# sequence GGGAAACCC\nmodel.pdb (((...)))\n", "GGGAAACCC").unwrap();
        assert_eq!(set.n_frames, 1);
        assert_eq!(set.chains.len(), 1);
        assert_eq!(set.chains[0].pairs(), vec![(0, 8), (1, 7), (2, 6)]);
        assert!(set.chains[0].interactions()[0].kind.is_canonical_pair());
    }

    #[test]
    fn pseudoknot_brackets_are_matched_independently() {
        let set = read("((..[[..))..]]\n", "GGAACCAAGGAACC").unwrap();
        assert_eq!(
            set.chains[0].pairs(),
            vec![(0, 9), (1, 8), (4, 13), (5, 12)]
        );
        assert_eq!(set.chains[0].interactions()[2].code, "[]");
    }

    #[test]
    fn chain_break_splits_pairs_by_five_prime_residue() {
        let set = read("((..&..))\n", "GGAAAACC").unwrap();
        assert_eq!(set.chains.len(), 2);
        assert_eq!(set.chains[0].pairs(), vec![(0, 7), (1, 6)]);
        assert!(set.chains[1].pairs().is_empty());
    }

    #[test]
    fn pairs_are_unioned_over_frames_with_frequencies() {
        let set = read("0 ((...))\n1 (.....)\n", "GGAAACC").unwrap();
        assert_eq!(set.n_frames, 2);
        let interactions = set.chains[0].interactions();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].frequency, 1.0);
        assert_eq!(interactions[1].frequency, 0.5);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = read("((...))\n", "GGAAACCC").unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::LengthMismatch {
                expected: 8,
                found: 7
            }
        ));
    }

    #[test]
    fn unbalanced_brackets_are_rejected() {
        assert!(matches!(
            read("(((...))\n", "GGGAAACC").unwrap_err(),
            AnnotationError::Parse { line: 1, .. }
        ));
        assert!(matches!(
            read("((...)))\n", "GGAAACCC").unwrap_err(),
            AnnotationError::Parse { .. }
        ));
    }

    #[test]
    fn file_without_frames_is_empty() {
        assert!(matches!(
            read("# only a comment\n\n", "GG").unwrap_err(),
            AnnotationError::Empty
        ));
    }
}
