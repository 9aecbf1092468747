//! The mortgage credit application script: a fixed list of questions in four
//! sections, a credit risk analysis by the model and a final summary.

use intake_core::collect::{Questionnaire, Section, Strategy};

/// Returns the questionnaire of a credit application.
pub fn questionnaire() -> Questionnaire {
    Questionnaire::new()
        .section(personal_info())
        .section(financial_info())
        .section(property_info())
        .section(loan_terms())
        .with_summary(SUMMARY)
}

/// Returns the collection strategy for a credit application.
#[inline]
pub fn strategy() -> Strategy {
    Strategy::FixedSequence(questionnaire())
}

fn personal_info() -> Section {
    Section::new("Personal information")
        .in_group("personal_info")
        .with_intro(
            "The user is starting a mortgage application. We will collect the \
             borrower's full name, age, phone number and email, one question \
             at a time. Greet the user in one short sentence.",
        )
        .ask("full_name", "Please enter your full name:")
        .ask("age", "Thank you, {full_name}. How old are you?")
        .ask("phone", "Your phone number:")
        .ask("email", "Your email address:")
}

fn financial_info() -> Section {
    Section::new("Financial information")
        .in_group("financial_info")
        .with_intro(
            "The user has provided: name {full_name}, age {age}, phone \
             {phone}, email {email}. Next we collect monthly income, \
             employment status and credit history. Introduce this step in \
             one short sentence.",
        )
        .ask("monthly_income", "What is your monthly income?")
        .ask(
            "employment_status",
            "What is your current status: employed, student, retired or \
             other?",
        )
        .ask("credit_history", "Do you have a credit history? (yes/no)")
        .derive(
            "llm_credit_analysis",
            "The user earns {monthly_income} a month, employment status: \
             {employment_status}, has a credit history: {credit_history}. \
             Assess the credit risk level and suggest how to improve the \
             credit history.",
        )
}

fn property_info() -> Section {
    Section::new("Property information")
        .in_group("property_info")
        .with_intro(
            "The user has provided: {full_name}, age {age}, income \
             {monthly_income}, status {employment_status}. Next we collect \
             the property type, its cost, the purchase timeline and the down \
             payment. Introduce this step in one short sentence.",
        )
        .ask(
            "property_type",
            "What type of property do you plan to buy? (apartment, house, \
             etc.)",
        )
        .ask("cost", "What is the approximate cost of the property?")
        .ask("timeline", "When do you plan to buy it?")
        .ask("down_payment", "How large a down payment do you plan?")
}

fn loan_terms() -> Section {
    Section::new("Loan terms")
        .in_group("loan_terms")
        .with_intro(
            "The user has provided: {full_name}, income {monthly_income}, \
             status {employment_status}, property {property_type} costing \
             {cost}. Next we collect the loan amount, term, purpose and \
             repayment schedule. Introduce this step in one short sentence.",
        )
        .ask("loan_amount", "How much would you like to borrow?")
        .ask("loan_term", "For how many years?")
        .ask("purpose", "What is the purpose of the loan?")
        .ask(
            "payment_schedule",
            "Which repayment schedule do you prefer? (annuity, \
             differentiated, etc.)",
        )
}

const SUMMARY: &str = "Collected client information:\n\
    Personal: {full_name}, age {age}, phone {phone}, email {email}\n\
    Financial: income {monthly_income}, status {employment_status}, credit \
    history {credit_history}\n\
    Property: type {property_type}, cost {cost}, timeline {timeline}, down \
    payment {down_payment}\n\
    Loan: amount {loan_amount}, term {loan_term}, purpose {purpose}, \
    schedule {payment_schedule}\n\
    Write a short summary of all the collected data.";

#[cfg(test)]
mod tests {
    use intake_core::SessionBuilder;
    use intake_core::collect::{Collector, Outcome, Step};
    use intake_core::console::ScriptedConsole;
    use intake_test_model::TestModelProvider;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_questionnaire_shape() {
        let questionnaire = questionnaire();
        let groups: Vec<_> = questionnaire
            .sections
            .iter()
            .map(|section| section.group.as_deref().unwrap())
            .collect();
        assert_eq!(
            groups,
            ["personal_info", "financial_info", "property_info", "loan_terms"]
        );

        let derived: Vec<_> = questionnaire
            .sections
            .iter()
            .flat_map(|section| &section.steps)
            .filter_map(|step| match step {
                Step::Derive { key, .. } => Some(key.as_str()),
                Step::Ask { .. } => None,
            })
            .collect();
        assert_eq!(derived, ["llm_credit_analysis"]);
        assert!(questionnaire.summary.is_some());
    }

    #[tokio::test]
    async fn test_full_application() {
        let model_provider = TestModelProvider::default();
        for reply in [
            "Welcome!",
            "Now your finances.",
            "Moderate risk.",
            "Now the property.",
            "Now the loan.",
            "Ann Lee wants 4000000 for 20 years.",
        ] {
            model_provider.add_text_response(reply);
        }

        let mut session =
            SessionBuilder::with_model_provider(model_provider.clone()).build();
        let mut console = ScriptedConsole::new([
            "Ann Lee",
            "34",
            "+1 555 0100",
            "ann@example.com",
            "5000",
            "employed",
            "yes",
            "apartment",
            "5000000",
            "next spring",
            "1000000",
            "4000000",
            "20",
            "buying a home",
            "annuity",
        ]);

        let Outcome::Completed(collected) =
            Collector::new(strategy()).run(&mut session, &mut console).await
        else {
            panic!("collection aborted");
        };
        assert_eq!(
            collected.record["financial_info"],
            json!({
                "monthly_income": "5000",
                "employment_status": "employed",
                "credit_history": "yes",
                "llm_credit_analysis": "Moderate risk.",
            })
        );
        assert_eq!(collected.record["loan_terms"]["payment_schedule"], "annuity");

        let requests = model_provider.requests();
        assert_eq!(requests.len(), 6);
        let summary = requests[5].messages.last().unwrap().content();
        assert!(summary.contains("Personal: Ann Lee, age 34"));
        assert!(summary.contains("schedule annuity\n"));
        assert_eq!(model_provider.remaining(), 0);
    }
}
