use super::traits::AnnotationFile;
use crate::core::models::annotation::{AnnotationError, AnnotationSet, ChainAnnotation, Interaction};
use crate::core::models::sequence::Sequence;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::{debug, warn};

/// Reader for pairing and stacking annotations.
///
/// Data lines have the form `RES1 RES2 CODE` where a residue token is `NAME_ID_CHAIN`,
/// e.g. `G_12_0`. Comment lines start with `#`; a `# frame ...` or `# PDB ...` comment opens a
/// new frame. Files without frame comments hold a single frame.
pub struct PairingFile;

#[derive(Debug, Clone, PartialEq)]
struct ResidueToken {
    name: String,
    id: i64,
    chain: String,
}

fn parse_residue_token(token: &str, line: usize) -> Result<ResidueToken, AnnotationError> {
    let mut parts = token.rsplitn(3, '_');
    let (Some(chain), Some(id), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AnnotationError::Parse {
            line,
            message: format!("residue token '{}' is not of the form NAME_ID_CHAIN", token),
        });
    };
    let id = id.parse().map_err(|_| AnnotationError::Parse {
        line,
        message: format!("invalid residue number '{}' in '{}'", id, token),
    })?;
    Ok(ResidueToken {
        name: name.to_string(),
        id,
        chain: chain.to_string(),
    })
}

fn is_frame_header(comment: &str) -> bool {
    let comment = comment.trim_start_matches('#').trim_start();
    comment.starts_with("frame") || comment.starts_with("PDB")
}

fn resolve_index(
    token: &ResidueToken,
    sequence: &Sequence,
) -> Result<usize, AnnotationError> {
    let index = sequence
        .index_of(token.id)
        .ok_or(AnnotationError::UnknownResidue { id: token.id })?;
    let expected = sequence.letter(index);
    let found = token.name.chars().next_back();
    if expected.map(|c| c.to_ascii_uppercase()) != found.map(|c| c.to_ascii_uppercase()) {
        warn!(
            residue = token.id,
            "Annotation names residue '{}' but the sequence has '{}'.",
            token.name,
            expected.unwrap_or('?')
        );
    }
    Ok(index)
}

impl AnnotationFile for PairingFile {
    fn read_from(
        reader: &mut impl BufRead,
        sequence: &Sequence,
    ) -> Result<AnnotationSet, AnnotationError> {
        let mut n_frames = 0usize;
        let mut chain_order: Vec<String> = Vec::new();
        let mut contacts: Vec<(String, Interaction)> = Vec::new();
        let mut counts: HashMap<(String, usize, usize, bool), (usize, usize)> = HashMap::new();

        for (line_idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('#') {
                if is_frame_header(trimmed) {
                    n_frames += 1;
                }
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            let [first, second, code, ..] = fields.as_slice() else {
                return Err(AnnotationError::Parse {
                    line: line_no,
                    message: "expected 'RES1 RES2 ANNOTATION'".to_string(),
                });
            };
            n_frames = n_frames.max(1);

            let res_a = parse_residue_token(first, line_no)?;
            let res_b = parse_residue_token(second, line_no)?;
            let i = resolve_index(&res_a, sequence)?;
            let j = resolve_index(&res_b, sequence)?;
            let interaction = Interaction::new(i, j, code);

            if !chain_order.contains(&res_a.chain) {
                chain_order.push(res_a.chain.clone());
            }
            let key = (
                res_a.chain.clone(),
                interaction.i,
                interaction.j,
                interaction.kind.is_stack(),
            );
            match counts.get_mut(&key) {
                Some((slot, count)) => {
                    *count += 1;
                    contacts[*slot].1 = interaction;
                }
                None => {
                    counts.insert(key, (contacts.len(), 1));
                    contacts.push((res_a.chain, interaction));
                }
            }
        }

        if n_frames == 0 {
            return Err(AnnotationError::Empty);
        }

        let mut chains: Vec<ChainAnnotation> =
            chain_order.iter().map(ChainAnnotation::new).collect();
        for (chain, interaction) in contacts {
            let key = (
                chain.clone(),
                interaction.i,
                interaction.j,
                interaction.kind.is_stack(),
            );
            let count = counts[&key].1;
            let Some(slot) = chain_order.iter().position(|c| *c == chain) else {
                continue;
            };
            chains[slot].insert(interaction.with_frequency(count as f64 / n_frames as f64));
        }

        debug!(
            frames = n_frames,
            chains = chains.len(),
            "Parsed pairing/stacking annotation."
        );
        Ok(AnnotationSet::new(chains, n_frames))
    }
}
