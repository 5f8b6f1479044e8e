use super::error::TreeError;
use super::node::NodeId;
use super::tree::Tree;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, map_res, opt, recognize},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    multi::{many1, separated_list1},
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};
use std::collections::BTreeMap;

// ================================================================================================
// Error Handling Structures
// ================================================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

/// A custom error type for nom that accumulates context and error kinds,
/// so a failed parse can be turned into a `TreeError::ParseError` with a
/// line/column and a short snippet instead of a bare nom error code.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailedError<'a> {
    pub errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for DetailedError<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: E) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }
}

// ================================================================================================
// Intermediate Structure
// ================================================================================================

/// `ParsedNode` is a temporary recursive structure used during parsing.
/// It mirrors the structure of a Newick tree node (spec.md §3's "Clade")
/// independently of the final arena-based `Tree`.
///
/// Parsing a recursive grammar like Newick is easiest against a recursive
/// data type; once parsing completes, `to_tree` flattens it into the arena.
#[derive(Debug)]
struct ParsedNode {
    name: Option<String>,
    length: Option<f64>,
    properties: Option<BTreeMap<String, String>>, // NHX comments: [&&NHX:key=value] — parsed, not persisted
    children: Vec<ParsedNode>,
}

impl ParsedNode {
    fn new() -> Self {
        Self {
            name: None,
            length: None,
            properties: None,
            children: Vec::new(),
        }
    }

    /// Converts this recursive `ParsedNode` into nodes in the provided `Tree` arena.
    /// Returns the `NodeId` of the created node.
    fn to_tree(self, tree: &mut Tree) -> NodeId {
        let id = tree.add_node();
        for child in self.children {
            let child_id = child.to_tree(tree);
            // Safe: `id` was just created and exists in the arena.
            tree.add_child(id, child_id).unwrap();
        }
        if let Some(node) = tree.get_node_mut(id) {
            node.name = self.name;
            node.length = self.length;
            node.properties = self.properties;
        }
        id
    }
}

// ================================================================================================
// Parsers
// ================================================================================================

// Whitespace eater: wraps another parser, ignoring surrounding whitespace.
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// Label: supports unquoted strings (stop at reserved chars), single-quoted,
// and double-quoted strings with doubled-quote escaping.
fn parse_label(input: &str) -> IResult<&str, String, DetailedError<'_>> {
    let unquoted = map(take_while(|c: char| !"():;,[]".contains(c)), |s: &str| {
        s.trim().to_string()
    });

    let single_quoted = delimited(
        char('\''),
        map(is_not("'"), |s: &str| s.replace("''", "'")),
        char('\''),
    );

    let double_quoted = delimited(
        char('"'),
        map(is_not("\""), |s: &str| s.replace("\"\"", "\"")),
        char('"'),
    );

    context("label", alt((single_quoted, double_quoted, unquoted))).parse(input)
}

// Branch length: follows a colon, e.g. ":0.123" or ":1.5e-2".
fn parse_length(input: &str) -> IResult<&str, f64, DetailedError<'_>> {
    context(
        "length",
        preceded(
            ws(char(':')),
            cut(map_res(
                recognize((
                    opt(char('-')),
                    digit1,
                    opt((char('.'), digit1)),
                    opt((
                        alt((char('e'), char('E'))),
                        opt(alt((char('+'), char('-')))),
                        digit1,
                    )),
                )),
                |s: &str| s.parse::<f64>(),
            )),
        ),
    )
    .parse(input)
}

// Comment: `[...]`, specifically NHX-style `[&&NHX:key=value:...]`. Returns
// `Some(map)` for a recognised key=value comment, `None` for a bare comment.
fn parse_comment(
    input: &str,
) -> IResult<&str, Option<BTreeMap<String, String>>, DetailedError<'_>> {
    let comment_content = delimited(ws(char('[')), is_not("]"), char(']'));

    context(
        "comment",
        map(opt(comment_content), |content: Option<&str>| {
            if let Some(s) = content {
                if let Some(rest) = s.strip_prefix("&&NHX") {
                    let mut props = BTreeMap::new();
                    for part in rest.split(':') {
                        if let Some((k, v)) = part.split_once('=') {
                            props.insert(k.to_string(), v.to_string());
                        }
                    }
                    if !props.is_empty() {
                        return Some(props);
                    }
                } else {
                    let mut props = BTreeMap::new();
                    for part in s.split_whitespace() {
                        if let Some((k, v)) = part.split_once('=') {
                            props.insert(k.to_string(), v.to_string());
                        }
                    }
                    if !props.is_empty() {
                        return Some(props);
                    }
                }
            }
            None
        }),
    )
    .parse(input)
}

// Subtree: `(child1, child2, ...)Label:Length[Comment]`, fully recursive.
fn parse_subtree(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    let (input, children) = context(
        "children",
        opt(delimited(
            ws(char('(')),
            separated_list1(ws(char(',')), parse_subtree),
            ws(char(')')),
        )),
    )
    .parse(input)?;

    let (input, label) = opt(parse_label).parse(input)?;

    // Newick allows a comment before or after the branch length.
    let (input, comment1) = parse_comment(input)?;
    let (input, length) = opt(parse_length).parse(input)?;
    let (input, comment2) = parse_comment(input)?;

    let mut node = ParsedNode::new();
    if let Some(c) = children {
        node.children = c;
    }
    if let Some(l) = label {
        if !l.is_empty() {
            node.name = Some(l);
        }
    }
    node.length = length;

    if comment1.is_some() || comment2.is_some() {
        let mut props = BTreeMap::new();
        if let Some(p) = comment1 {
            props.extend(p);
        }
        if let Some(p) = comment2 {
            props.extend(p);
        }
        node.properties = Some(props);
    }

    Ok((input, node))
}

// ================================================================================================
// Entry Points
// ================================================================================================

/// Parse a single Newick tree string (spec.md §4.A grammar: `tree := clade ";"`).
pub fn parse_newick(input: &str) -> Result<Tree, TreeError> {
    let mut parser = (ws(parse_subtree), ws(char(';')));

    match parser.parse(input) {
        Ok((remaining, (root_node, _))) => {
            if !remaining.trim().is_empty() {
                let offset = input.offset(remaining);
                return Err(TreeError::ParseError {
                    message: "trailing garbage after tree".to_string(),
                    line: 0,
                    column: offset,
                    snippet: remaining.chars().take(50).collect(),
                });
            }
            let mut tree = Tree::new();
            let root_id = root_node.to_tree(&mut tree);
            tree.set_root(root_id);
            Ok(tree)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_tree_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(TreeError::ParseError {
            message: "incomplete input".to_string(),
            line: 0,
            column: 0,
            snippet: String::new(),
        }),
    }
}

/// Parse a string containing multiple Newick trees, permitting top-level
/// bracketed "garbage" blocks (file headers/comments) between trees.
pub fn parse_newick_multi(input: &str) -> Result<Vec<Tree>, TreeError> {
    let valid_tree = map((ws(parse_subtree), ws(char(';'))), |(root, _)| Some(root));

    let garbage = map(
        ws(delimited(char('['), take_while(|c| c != ']'), char(']'))),
        |_| None,
    );

    let mut parser = many1(alt((valid_tree, garbage)));

    match parser.parse(input) {
        Ok((_, trees_data)) => {
            let mut trees = Vec::new();
            for root_opt in trees_data {
                if let Some(root_node) = root_opt {
                    let mut tree = Tree::new();
                    let root_id = root_node.to_tree(&mut tree);
                    tree.set_root(root_id);
                    trees.push(tree);
                }
            }
            Ok(trees)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_tree_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(TreeError::ParseError {
            message: "incomplete input".to_string(),
            line: 0,
            column: 0,
            snippet: String::new(),
        }),
    }
}

/// Like `parse_newick_multi`, but also returns each tree's own verbatim
/// source slice (trimmed of surrounding whitespace), so callers that split a
/// multi-tree file can still satisfy spec.md §3's "newick ... preserved
/// verbatim" invariant per individual tree instead of only for whole-file input.
pub fn parse_newick_multi_spans(input: &str) -> Result<Vec<(Tree, String)>, TreeError> {
    let mut valid_tree = map((ws(parse_subtree), ws(char(';'))), |(root, _)| Some(root));
    let mut garbage = map(
        ws(delimited(char('['), take_while(|c| c != ']'), char(']'))),
        |_| None,
    );

    let mut rest = input;
    let mut out = Vec::new();
    loop {
        let before = rest;
        match valid_tree.parse(rest) {
            Ok((tail, Some(root_node))) => {
                let consumed = before.offset(tail);
                let span = before[..consumed].trim().to_string();
                let mut tree = Tree::new();
                let root_id = root_node.to_tree(&mut tree);
                tree.set_root(root_id);
                out.push((tree, span));
                rest = tail;
                continue;
            }
            Ok((_, None)) => unreachable!(),
            Err(_) => {}
        }
        match garbage.parse(rest) {
            Ok((tail, _)) => {
                rest = tail;
                continue;
            }
            Err(_) => break,
        }
    }

    if rest.trim().is_empty() {
        if out.is_empty() {
            return Err(TreeError::ParseError {
                message: "no tree found in input".to_string(),
                line: 1,
                column: 1,
                snippet: input.chars().take(50).collect(),
            });
        }
        Ok(out)
    } else {
        match (ws(parse_subtree), ws(char(';'))).parse(rest) {
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_tree_error(rest, e)),
            _ => Err(TreeError::ParseError {
                message: "trailing garbage after last tree".to_string(),
                line: 0,
                column: 0,
                snippet: rest.chars().take(50).collect(),
            }),
        }
    }
}

// Turn an accumulated nom error into a friendly, located `TreeError`.
fn make_tree_error(input: &str, e: DetailedError) -> TreeError {
    let (remaining, _) = e.errors.first().unwrap();
    let offset = input.offset(remaining);

    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    let mut msg = String::new();
    for (_, kind) in e.errors.iter().rev() {
        match kind {
            DetailedErrorKind::Context(ctx) => {
                msg.push_str(&format!("while parsing {}:\n", ctx));
            }
            DetailedErrorKind::Nom(k) => {
                msg.push_str(&format!("  error: {:?}\n", k));
            }
        }
    }

    TreeError::ParseError {
        message: msg,
        line,
        column,
        snippet: remaining.chars().take(50).collect(),
    }
}

impl Tree {
    /// Parse a Newick string into a Tree.
    ///
    /// # Example
    /// ```
    /// use nwkix::libs::phylo::tree::Tree;
    ///
    /// let tree = Tree::from_newick("(A:0.1,B:0.2)Root;").unwrap();
    /// assert_eq!(tree.len(), 3);
    ///
    /// let result = Tree::from_newick("(A,B:invalid)C;");
    /// assert!(result.is_err());
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, TreeError> {
        parse_newick(input)
    }

    /// Parse a string possibly containing several semicolon-terminated trees.
    pub fn from_newick_multi(input: &str) -> Result<Vec<Self>, TreeError> {
        parse_newick_multi(input)
    }

    /// Like `from_newick_multi`, pairing each tree with its own verbatim
    /// source slice.
    pub fn from_newick_multi_spans(input: &str) -> Result<Vec<(Self, String)>, TreeError> {
        parse_newick_multi_spans(input)
    }
}
