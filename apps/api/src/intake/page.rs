use std::fmt::{self, Display};

use super::flash::FlashStatus;

/// The request form, with the outcome of the previous submission (if any)
/// shown above it. Only fixed server-side strings are interpolated.
#[derive(Debug, Default)]
pub struct RequestCvPage {
    pub flash: Option<FlashStatus>,
}

impl Display for RequestCvPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let banner = match self.flash {
            Some(status) => format!(
                r#"<div class="flash flash-{}" role="status">{}</div>"#,
                status.category(),
                status.message()
            ),
            None => String::new(),
        };

        write!(
            f,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Request my CV</title>
</head>
<body>
    <main>
        <h1>Request my CV</h1>
        {banner}
        <form method="post" action="/submit_cv">
            <label>Full name <input type="text" name="fullName" required></label>
            <label>Phone number <input type="tel" name="phoneNumber" required></label>
            <label>Your email <input type="email" name="requesterEmail"></label>
            <label>Company / institution <input type="text" name="companyName" required></label>
            <label>Position <input type="text" name="position" required></label>
            <label>Company email <input type="email" name="companyEmail" required></label>
            <label>Company address <input type="text" name="companyAddress"></label>
            <label>Company phone <input type="tel" name="companyContact"></label>
            <button type="submit">Request CV</button>
        </form>
    </main>
</body>
</html>
"#
        )
    }
}
