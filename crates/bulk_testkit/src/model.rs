//! Reference model of block grouping.
//!
//! Computes the blocks an accumulator should emit for a token stream when
//! every write succeeds. Property tests compare the real accumulator against
//! this model.

use crate::generators::Token;

/// Blocks predicted for one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedRun {
    /// Blocks in flush order.
    pub blocks: Vec<Vec<String>>,
    /// Depth and discarded command count if the stream ended inside a block.
    pub unclosed: Option<(usize, usize)>,
}

/// Predicts the blocks for `tokens` with the given static block size.
///
/// # Panics
///
/// Panics on a close token at depth zero; feed it balanced or open-ended
/// streams only.
pub fn expected_blocks(block_size: usize, tokens: &[Token]) -> ExpectedRun {
    let mut run = ExpectedRun::default();
    let mut depth = 0usize;
    let mut current: Vec<String> = Vec::new();

    for token in tokens {
        match token {
            Token::Open => {
                if depth == 0 && !current.is_empty() {
                    run.blocks.push(std::mem::take(&mut current));
                }
                depth += 1;
            }
            Token::Close => {
                assert!(depth > 0, "stray close in model input");
                depth -= 1;
                if depth == 0 && !current.is_empty() {
                    run.blocks.push(std::mem::take(&mut current));
                }
            }
            Token::Command(cmd) => {
                current.push(cmd.clone());
                if depth == 0 && current.len() == block_size {
                    run.blocks.push(std::mem::take(&mut current));
                }
            }
        }
    }

    if depth > 0 {
        run.unclosed = Some((depth, current.len()));
    } else if !current.is_empty() {
        run.blocks.push(current);
    }

    run
}
