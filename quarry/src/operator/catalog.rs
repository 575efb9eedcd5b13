//! The operator catalog.
//!
//! Every function here binds a keyword to one of the five combinator shapes. The
//! tables are grouped by shape; the server's own reference groups them by topic, so
//! the topic is noted per entry where the name alone is ambiguous.

use super::combinator::{flexible, identity, nullary, options, variadic};
use super::window::hoist_window;
use crate::expression::Expr;

macro_rules! identity_operators {
    ($($(#[$meta:meta])* $name:ident => $keyword:literal;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(arg: impl Into<Expr>) -> Expr {
                identity($keyword).call1(arg)
            }
        )*
    };
}

macro_rules! variadic_operators {
    ($($(#[$meta:meta])* $name:ident => $keyword:literal;)*) => {
        $(
            $(#[$meta])*
            pub fn $name<I, E>(args: I) -> Expr
            where
                I: IntoIterator<Item = E>,
                E: Into<Expr>,
            {
                variadic($keyword).call(args.into_iter().map(Into::into).collect())
            }
        )*
    };
}

// variadic shape with a fixed pair of positional arguments
macro_rules! binary_operators {
    ($($(#[$meta:meta])* $name:ident => $keyword:literal;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
                variadic($keyword).call(vec![lhs.into(), rhs.into()])
            }
        )*
    };
}

macro_rules! options_operators {
    ($($(#[$meta:meta])* $name:ident => $keyword:literal;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(spec: impl Into<Expr>) -> Expr {
                options($keyword).call1(spec)
            }
        )*
    };
}

macro_rules! flexible_operators {
    ($($(#[$meta:meta])* $name:ident => $keyword:literal;)*) => {
        $(
            $(#[$meta])*
            pub fn $name<I, E>(args: I) -> Expr
            where
                I: IntoIterator<Item = E>,
                E: Into<Expr>,
            {
                flexible($keyword).call(args.into_iter().map(Into::into).collect())
            }
        )*
    };
}

macro_rules! nullary_operators {
    ($($(#[$meta:meta])* $name:ident => $keyword:literal;)*) => {
        $(
            $(#[$meta])*
            pub fn $name() -> Expr {
                nullary($keyword).call(Vec::new())
            }
        )*
    };
}

identity_operators! {
    // arithmetic
    abs => "abs";
    ceil => "ceil";
    floor => "floor";
    exp => "exp";
    ln => "ln";
    log10 => "log10";
    sqrt => "sqrt";

    // array
    size => "size";
    is_array => "isArray";
    reverse_array => "reverseArray";
    array_to_object => "arrayToObject";
    object_to_array => "objectToArray";
    any_element_true => "anyElementTrue";
    all_elements_true => "allElementsTrue";
    /// Array element operator and group accumulator alike.
    first => "first";
    /// Array element operator and group accumulator alike.
    last => "last";

    // accumulators
    push => "push";
    add_to_set => "addToSet";

    // dates: a date expression or `{ date, timezone }`
    year => "year";
    month => "month";
    day_of_month => "dayOfMonth";
    day_of_week => "dayOfWeek";
    day_of_year => "dayOfYear";
    hour => "hour";
    minute => "minute";
    second => "second";
    millisecond => "millisecond";
    week => "week";
    iso_week => "isoWeek";
    iso_week_year => "isoWeekYear";
    iso_day_of_week => "isoDayOfWeek";

    // strings
    to_lower => "toLower";
    to_upper => "toUpper";
    str_len_bytes => "strLenBytes";
    str_len_cp => "strLenCP";

    // types
    type_of => "type";
    is_number => "isNumber";
    to_bool => "toBool";
    to_date => "toDate";
    to_decimal => "toDecimal";
    to_double => "toDouble";
    to_int => "toInt";
    to_long => "toLong";
    to_object_id => "toObjectId";
    to_string => "toString";

    // window
    locf => "locf";
    linear_fill => "linearFill";

    // misc
    /// Returns its argument without the server parsing it as an expression.
    literal => "literal";
    /// Text-search or index metadata, e.g. `meta("textScore")`.
    meta => "meta";
}

variadic_operators! {
    add => "add";
    multiply => "multiply";
    /// `[number, place]`; place is optional.
    round => "round";
    /// `[number, place]`; place is optional.
    trunc => "trunc";

    concat_arrays => "concatArrays";
    index_of_array => "indexOfArray";
    range => "range";
    slice => "slice";

    set_union => "setUnion";
    set_intersection => "setIntersection";
    set_equals => "setEquals";

    and => "and";
    or => "or";
    if_null => "ifNull";

    concat => "concat";
    index_of_bytes => "indexOfBytes";
    index_of_cp => "indexOfCP";
    substr_bytes => "substrBytes";
    substr_cp => "substrCP";

    covariance_pop => "covariancePop";
    covariance_samp => "covarianceSamp";
}

binary_operators! {
    subtract => "subtract";
    divide => "divide";
    modulo => "mod";
    pow => "pow";
    log => "log";

    array_elem_at => "arrayElemAt";
    is_in => "in";
    set_difference => "setDifference";
    set_is_subset => "setIsSubset";

    eq => "eq";
    ne => "ne";
    gt => "gt";
    gte => "gte";
    lt => "lt";
    lte => "lte";
    cmp => "cmp";

    split => "split";
    strcasecmp => "strcasecmp";
}

options_operators! {
    switch => "switch";
    zip => "zip";
    sort_array => "sortArray";
    first_n => "firstN";
    last_n => "lastN";
    max_n => "maxN";
    min_n => "minN";
    top => "top";
    top_n => "topN";
    bottom => "bottom";
    bottom_n => "bottomN";

    date_add => "dateAdd";
    date_subtract => "dateSubtract";
    date_diff => "dateDiff";
    date_from_parts => "dateFromParts";
    date_from_string => "dateFromString";
    date_to_parts => "dateToParts";
    date_to_string => "dateToString";
    date_trunc => "dateTrunc";

    trim => "trim";
    ltrim => "ltrim";
    rtrim => "rtrim";
    regex_match => "regexMatch";
    regex_find => "regexFind";
    regex_find_all => "regexFindAll";
    replace_one => "replaceOne";
    replace_all => "replaceAll";

    convert => "convert";
    get_field => "getField";
    set_field => "setField";
    unset_field => "unsetField";

    shift => "shift";
    exp_moving_avg => "expMovingAvg";
}

flexible_operators! {
    sum => "sum";
    avg => "avg";
    max => "max";
    min => "min";
    std_dev_pop => "stdDevPop";
    std_dev_samp => "stdDevSamp";
    merge_objects => "mergeObjects";
}

nullary_operators! {
    /// The `$count` accumulator.
    count => "count";
    rand => "rand";
    rank => "rank";
    dense_rank => "denseRank";
    document_number => "documentNumber";
}

/// `{ $not: [expr] }`.
pub fn not(expr: impl Into<Expr>) -> Expr {
    variadic("not").call(vec![expr.into()])
}

fn cond_branches(args: Vec<Expr>) -> Vec<Expr> {
    if args.len() != 3 {
        return args;
    }
    let mut args = args.into_iter();
    let branches = Expr::record()
        .with("if", args.next().unwrap_or_default())
        .with("then", args.next().unwrap_or_default())
        .with("else", args.next().unwrap_or_default());
    vec![branches]
}

/// `{ $cond: { if, then, else } }` from three positional arguments.
pub fn cond(
    condition: impl Into<Expr>,
    then: impl Into<Expr>,
    otherwise: impl Into<Expr>,
) -> Expr {
    options("cond")
        .with_pre(cond_branches)
        .call(vec![condition.into(), then.into(), otherwise.into()])
}

/// `{ $derivative: { input, unit }, window: ... }`.
///
/// A `window` entry in `spec` is moved next to the operator, where
/// `$setWindowFields` expects it.
pub fn derivative(spec: impl Into<Expr>) -> Expr {
    options("derivative").with_post(hoist_window).call1(spec)
}

/// `{ $integral: { input, unit }, window: ... }`, hoisting `window` like
/// [`derivative`].
pub fn integral(spec: impl Into<Expr>) -> Expr {
    options("integral").with_post(hoist_window).call1(spec)
}
