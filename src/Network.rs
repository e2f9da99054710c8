/// Compounds, reactions and the network that holds them.
///
/// A reaction is a list of (compound, signed coefficient) entries: negative for
/// reactants, positive for products. Compounds are identified by id and compartment;
/// the formula belongs to the compound id and is shared by all compartments.
pub mod model;
/// Parser of reaction equations in the text form used by model reaction tables:
/// ```text
/// (2) ficytcc553[c] + so3[c] + h2o[c] --> (2) focytcc553[c] + so4[c] + (2) h[e]
/// [c] : akg + ala-L <=> glu-L + pyr
/// |D-glucose 6-phosphate|[c] <=> |D-fructose 6-phosphate|[c]
/// ```
/// Reverse arrows are normalized by swapping the sides.
///
///  # Examples
/// ```
/// use PrimaryPairs::Network::equation_parser::parse_equation;
/// let (_, compounds) = parse_equation("[c] : atp + ac <=> adp + actp").unwrap();
/// assert_eq!(compounds.len(), 4);
/// assert_eq!(compounds[0].1, -1.0);
/// ```
pub mod equation_parser;
/// Loading of compound tables, reaction tables and exclusion lists from text files.
pub mod load_from_file;
