/// Elemental formulas of compounds.
///
/// A formula is a mapping from element symbol to atom count. Symbols that are not
/// elements of the periodic table (R, X, Z...) are "variable groups": placeholders for
/// an unresolved substructure, kept as opaque pseudo-elements.
///
///  # Examples
/// ```
/// use PrimaryPairs::Chemistry::formula::Formula;
/// let atp: Formula = "C10H12N5O13P3".parse().unwrap();
/// assert_eq!(atp.count("P"), 3);
/// let acyl: Formula = "C2H3OR".parse().unwrap();
/// assert!(acyl.has_variable_groups());
/// assert_eq!(acyl.to_string(), "C2H3OR");
/// ```
pub mod formula;
/// Per-element weights used by the pairing engines.
///
/// Weights lie in [0, 1]; a wildcard weight `*` covers every element (and variable
/// group) without an explicit entry. The default is `C=1,H=0,*=0.82`.
///
///  # Examples
/// ```
/// use PrimaryPairs::Chemistry::element_weights::ElementWeights;
/// let weights: ElementWeights = "C=1,H=0,N=0.4,*=0.82".parse().unwrap();
/// assert_eq!(weights.get("N"), 0.4);
/// assert_eq!(weights.get("S"), 0.82);
/// ```
pub mod element_weights;
