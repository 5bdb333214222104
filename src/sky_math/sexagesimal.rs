use once_cell::sync::OnceCell;

/// Formats degrees (or hours) as `[-]DD:MM[:SS[.s]]`.
///
/// `frac` selects precision: 3 - minutes, 6 - seconds,
/// 8 - tenths of second, 9 - hundredths of second.
pub fn value_to_sexagesimal(value: f64, zero: bool, frac: u8) -> String {
    let is_neg = value < 0.0;
    let value = value.abs();
    let mut int = value.trunc() as i32;
    let round = match frac {
        9 => 0.5,
        8 => 5.0,
        6 => 50.0,
        3 => 50.0 * 60.0,
        _ => return value.to_string(),
    };
    let mut seconds100 = (value.fract() * 3600.0 * 100.0 + round) as u32;
    if seconds100 >= 3600 * 100 {
        int += 1;
        seconds100 -= 3600 * 100;
    }
    let minutes = seconds100 / 6000;
    seconds100 %= 6000;
    let int_str = if zero { format!("{:02}", int) } else { int.to_string() };
    let text = match frac {
        3 => format!("{}:{:02}", int_str, minutes),
        6 => format!("{}:{:02}:{:02}", int_str, minutes, seconds100 / 100),
        8 => format!("{}:{:02}:{:02}.{}", int_str, minutes, seconds100 / 100, (seconds100 % 100) / 10),
        _ => format!("{}:{:02}:{:02}.{:02}", int_str, minutes, seconds100 / 100, seconds100 % 100),
    };
    // Value rounded to zero has no sign
    let is_zero = text.chars().all(|c| !c.is_ascii_digit() || c == '0');
    if is_neg && !is_zero {
        format!("-{}", text)
    } else {
        text
    }
}

#[test]
fn test_value_to_sexagesimal() {
    assert_eq!(value_to_sexagesimal(10.5, true, 3), "10:30");
    assert_eq!(value_to_sexagesimal(-6.2, true, 6), "-06:12:00");
    assert_eq!(value_to_sexagesimal(1.5, false, 6), "1:30:00");
    assert_eq!(value_to_sexagesimal(106.8166, true, 8), "106:48:59.8");
    assert_eq!(value_to_sexagesimal(59.99999999, true, 6), "60:00:00");
    assert_eq!(value_to_sexagesimal(-1e-9, true, 6), "00:00:00");
    assert_eq!(value_to_sexagesimal(-0.001, false, 3), "0:00");
    assert_eq!(value_to_sexagesimal(-0.001, true, 9), "-00:00:03.60");
}

/// Parses `[+-]DD:MM`, `[+-]DD:MM.m` or `[+-]DD:MM:SS[.s]`
pub fn sexagesimal_to_value(text: &str) -> Option<f64> {
    static RE: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        regex::Regex::new(r"^([+-]?)(\d+):(\d+(?:\.\d+)?)(?::(\d+(?:\.\d+)?))?$")
            .expect("valid sexagesimal regex")
    });
    let res = re.captures(text.trim())?;
    let is_neg = &res[1] == "-";
    let int = res[2].parse::<f64>().ok()?;
    let minutes = res[3].parse::<f64>().ok()?;
    let seconds = match res.get(4) {
        Some(sec) => sec.as_str().parse::<f64>().ok()?,
        None => 0.0,
    };
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }
    let value = int + minutes / 60.0 + seconds / 3600.0;
    Some(if is_neg { -value } else { value })
}

#[test]
fn test_sexagesimal_to_value() {
    assert!(sexagesimal_to_value("").is_none());
    assert!(sexagesimal_to_value("abc").is_none());
    assert!(sexagesimal_to_value("10:75").is_none());
    assert_eq!(sexagesimal_to_value("1:00"), Some(1.0));
    assert_eq!(sexagesimal_to_value("-1:00"), Some(-1.0));
    assert_eq!(sexagesimal_to_value("10:30"), Some(10.5));
    assert_eq!(sexagesimal_to_value(" -10:30 "), Some(-10.5));
    assert_eq!(sexagesimal_to_value("+10:30:00"), Some(10.5));
    assert!(f64::abs(sexagesimal_to_value("10:30.3").unwrap() - 10.505) < 1e-12);
    assert!(f64::abs(sexagesimal_to_value("10:30:30").unwrap() - 10.508333333333333) < 1e-12);
    assert!(f64::abs(sexagesimal_to_value("-06:12:00.5").unwrap() - -6.200138888888889) < 1e-12);
}

/// Parses plain decimal (`-6.2`) or sexagesimal (`-06:12:00`) degrees
pub fn parse_degrees(text: &str) -> Option<f64> {
    let text = text.trim();
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .or_else(|| sexagesimal_to_value(text))
}

#[test]
fn test_parse_degrees() {
    assert_eq!(parse_degrees("-6.2000"), Some(-6.2));
    assert_eq!(parse_degrees(" 106.8166 "), Some(106.8166));
    assert!(f64::abs(parse_degrees("-06:12").unwrap() - -6.2) < 1e-12);
    assert_eq!(parse_degrees("NaN"), None);
    assert_eq!(parse_degrees("north"), None);
}
