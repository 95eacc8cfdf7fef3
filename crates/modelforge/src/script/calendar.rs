//! Master-calendar subroutine emission.

use crate::config::CalendarLanguage;

/// Attribute fields every generated calendar derives from its date field.
pub const CALENDAR_ATTRIBUTES: [&str; 6] =
    ["Year", "Quarter", "MonthNum", "MonthName", "Week", "Day"];

/// The generated calendar table name for a date field.
pub fn calendar_table_name(date_field: &str) -> String {
    format!("DIM_{}", date_field)
}

/// SET directives localizing month names for the chosen language.
pub fn month_name_directives(language: CalendarLanguage) -> String {
    format!(
        "SET MonthNames = '{}';\nSET LongMonthNames = '{}';",
        language.month_abbreviations().join(";"),
        language.month_names().join(";"),
    )
}

/// The reusable calendar subroutine: expands a date field's range into
/// Year/Quarter/MonthNum/MonthName/Week/Day attributes.
pub fn calendar_subroutine() -> String {
    let lines = [
        "SUB GenerateCalendar(vSourceTable, vDateField, vCalendarName)",
        "",
        "    _CalRange:",
        "    LOAD",
        "        Min($(vDateField)) AS _MinDate,",
        "        Max($(vDateField)) AS _MaxDate",
        "    RESIDENT $(vSourceTable);",
        "",
        "    LET _vMin = Peek('_MinDate', 0, '_CalRange');",
        "    LET _vMax = Peek('_MaxDate', 0, '_CalRange');",
        "    DROP TABLE _CalRange;",
        "",
        "    $(vCalendarName):",
        "    LOAD",
        "        TempDate AS $(vDateField),",
        "        Year(TempDate) AS Year,",
        "        'Q' & Ceil(Month(TempDate) / 3) AS Quarter,",
        "        Month(TempDate) AS MonthNum,",
        "        Month(TempDate) AS MonthName,",
        "        Week(TempDate) AS Week,",
        "        Day(TempDate) AS Day",
        "    LOAD",
        "        Date($(_vMin) + IterNo() - 1) AS TempDate",
        "    AUTOGENERATE 1",
        "    WHILE $(_vMin) + IterNo() - 1 <= $(_vMax);",
        "",
        "END SUB",
    ];
    lines.join("\n")
}

/// A CALL statement generating one calendar from a loaded table's date field.
pub fn calendar_call(source_table: &str, date_field: &str) -> String {
    format!(
        "CALL GenerateCalendar('{}', '{}', '{}');",
        source_table,
        date_field,
        calendar_table_name(date_field)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_table_name() {
        assert_eq!(calendar_table_name("OrderDate"), "DIM_OrderDate");
    }

    #[test]
    fn test_month_directives_localized() {
        let en = month_name_directives(CalendarLanguage::English);
        assert!(en.contains("Jan;Feb"));
        assert!(en.contains("January;February"));

        let de = month_name_directives(CalendarLanguage::German);
        assert!(de.contains("Januar;Februar"));
        assert!(de.contains("Mär"));
    }

    #[test]
    fn test_subroutine_is_bracket_balanced() {
        let sub = calendar_subroutine();
        let opens = sub.matches('[').count();
        let closes = sub.matches(']').count();
        assert_eq!(opens, closes);
        assert!(sub.contains("SUB GenerateCalendar"));
        assert!(sub.contains("END SUB"));
    }

    #[test]
    fn test_subroutine_derives_every_listed_attribute() {
        let sub = calendar_subroutine();
        for attr in CALENDAR_ATTRIBUTES {
            assert!(sub.contains(&format!("AS {}", attr)), "missing {}", attr);
        }
    }

    #[test]
    fn test_calendar_call_references_generated_name() {
        let call = calendar_call("FACT_Orders", "OrderDate");
        assert!(call.contains("'FACT_Orders'"));
        assert!(call.contains("'DIM_OrderDate'"));
    }
}
