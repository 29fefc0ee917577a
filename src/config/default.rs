// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Default configuration values.

/// Generate an example configuration file.
pub fn example_config() -> &'static str {
    r#"# approve configuration file

# Message overrides, keyed by test name. Placeholders such as {title},
# {min} or {max} are filled in from the rule set.
[messages]
required = "{title} is required"
email = "{title} must be a valid email address"

# Strength sub-check messages
[messages.strength]
message = "{title} did not pass the strength test."
isMinimum = "{title} must be at least {min} characters"
hasLower = "{title} must have at least 1 lower case character"

# Named rule sets, used with `approve check <VALUE> --rules <NAME>`.
# Rules run in the order they are written.
[rules.email]
title = "Email"
required = true
email = true

[rules.password]
title = "Password"
stop = true
required = true
strength = { min = 8, bonus = 10 }

[rules.birthday]
title = "Birthday"
ignoreNull = true
date = ["%m/%d/%Y", "%m/%d/%y"]
dateBefore = { date = "01/01/2010", config = { formats = ["%m/%d/%Y"] } }

# Output configuration
[output]
color = true
format = "text"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApproveConfig;

    #[test]
    fn test_example_config_parseable() {
        let example = example_config();
        let config: ApproveConfig = toml::from_str(example).expect("Example config should parse");
        assert_eq!(config.rule_set_names(), vec!["birthday", "email", "password"]);
        for name in config.rule_set_names() {
            assert!(config.rule_set(name).is_ok(), "{} should be a valid rule set", name);
        }
    }
}
