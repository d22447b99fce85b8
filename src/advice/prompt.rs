use crate::advice::AdviceRequest;
use std::fmt::Write;

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None reported".to_string()
    } else {
        items.join(", ")
    }
}

/// Render the patient profile and every calculation step into a prompt
pub fn build_prompt(request: &AdviceRequest<'_>) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "As a healthcare professional, provide detailed and personalized health \
         recommendations based on the following patient information:\n\n",
    );

    prompt.push_str("Patient Profile:\n");
    let _ = writeln!(prompt, "- Age: {} years", request.age);
    let _ = writeln!(prompt, "- Geographic Region: {}", request.region);
    let _ = writeln!(
        prompt,
        "- Chronic Conditions: {}",
        list_or_none(request.chronic_conditions)
    );
    let _ = writeln!(
        prompt,
        "- Family Medical History: {}",
        list_or_none(request.family_history)
    );
    let _ = writeln!(
        prompt,
        "- Lifestyle Assessment Score: {}/10",
        request.lifestyle_score
    );
    let _ = writeln!(
        prompt,
        "- Insurance Coverage: {}",
        if request.has_insurance {
            "Present"
        } else {
            "Not present"
        }
    );

    prompt.push_str("\nCost Analysis Details:\n");
    for step in request.details {
        let _ = writeln!(prompt, "- {}: {}", step.step_name(), step.description);
    }

    prompt.push_str(
        "\nPlease provide recommendations covering:\n\
         1. Preventive care: screenings, check-ups and vaccinations suited to the age, region and risk factors\n\
         2. Lifestyle: nutrition, physical activity, stress management and sleep\n\
         3. Risk management: managing existing chronic conditions and preventing conditions in the family history\n\
         4. Healthcare access: insurance options, provider selection and cost-effective use of care\n\n\
         Do not repeat any recommendation or heading. \
         When a recommendation follows a specific guideline, cite it in parentheses at the end. \
         When it relates to a risk factor or cost figure above, say that it is grounded in the data shown in the cost analysis. \
         Format each recommendation as one clear, actionable bullet point with measurable goals where possible.",
    );

    prompt
}
