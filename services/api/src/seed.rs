use distribution_hub::lending::{LendingConfiguration, LendingType, Product};
use distribution_hub::partners::{
    Agency, AgencyPaymentMethod, Agent, Distributor, DistributorStatus, PaymentMethodType,
};
use distribution_hub::records::RecordId;
use distribution_hub::terms::{
    TemplateCategory, TermsError, TermsTemplate, VariableSchema, VariableSpec, VariableType,
};
use distribution_hub::Hub;
use serde_json::json;

#[derive(Debug, Clone, Copy)]
pub(crate) struct DemoSeed {
    pub(crate) distributor_id: RecordId,
    pub(crate) agency_id: RecordId,
    pub(crate) product_id: RecordId,
    pub(crate) template_id: RecordId,
}

/// Loads one distributor with an agency, an agent, a product, and an approved default template.
pub(crate) fn seed_demo(hub: &Hub) -> Result<DemoSeed, TermsError> {
    let distributor = hub.distributors.create(Distributor {
        name: "Northwind Equipment S.A.".to_string(),
        display_name: Some("Northwind".to_string()),
        tax_id: Some("PT501234567".to_string()),
        registration_number: Some("CRC-44810".to_string()),
        email: Some("partners@northwind.example".to_string()),
        phone: Some("+351 220 000 111".to_string()),
        website: Some("https://northwind.example".to_string()),
        address: Some("Rua do Porto 10, 4000-001 Porto".to_string()),
        status: DistributorStatus::Active,
    })?;

    let agency = hub.agencies.create(Agency {
        distributor_id: distributor.id,
        name: "Northwind Lisboa".to_string(),
        code: "NW-LIS".to_string(),
        email: Some("lisboa@northwind.example".to_string()),
        phone: None,
        address: None,
        is_active: true,
    })?;

    hub.agents.create(Agent {
        distributor_id: distributor.id,
        agency_id: Some(agency.id),
        first_name: "Marta".to_string(),
        last_name: "Silva".to_string(),
        email: Some("marta.silva@northwind.example".to_string()),
        phone: None,
        employee_code: Some("NW-0007".to_string()),
        role: Some("sales".to_string()),
        is_active: true,
    })?;

    hub.payment_methods.create(AgencyPaymentMethod {
        agency_id: agency.id,
        method_type: PaymentMethodType::BankAccount,
        account_holder: Some("Northwind Lisboa".to_string()),
        account_identifier: "PT50000201231234567890154".to_string(),
        bank_name: Some("Banco Exemplo".to_string()),
        currency: "EUR".to_string(),
        is_primary: true,
        is_active: true,
    })?;

    let product = hub.products.create(Product {
        distributor_id: distributor.id,
        name: "Compact Tractor T100".to_string(),
        sku: "TR-100".to_string(),
        description: None,
        category: Some("machinery".to_string()),
        brand: Some("Agri".to_string()),
        model: Some("T100".to_string()),
        price: 18_500.0,
        currency: "EUR".to_string(),
        is_active: true,
    })?;

    hub.lending_configurations.create(LendingConfiguration {
        distributor_id: distributor.id,
        product_id: product.id,
        name: "Standard lease".to_string(),
        lending_type: LendingType::Lease,
        min_term_months: 12,
        max_term_months: 60,
        default_term_months: 36,
        interest_rate: 6.5,
        min_down_payment_percentage: 10.0,
        is_default: true,
        is_active: true,
    })?;

    let mut variables = VariableSchema::new();
    variables.insert(
        "credit_limit".to_string(),
        VariableSpec {
            kind: VariableType::Number,
            required: true,
            default: None,
            description: Some("Credit limit in EUR".to_string()),
        },
    );
    variables.insert(
        "territory".to_string(),
        VariableSpec {
            default: Some(json!("Portugal")),
            ..VariableSpec::default()
        },
    );

    let template = hub.terms.templates().create(TermsTemplate {
        name: "Distribution agreement".to_string(),
        description: Some("Standard terms for authorised distributors".to_string()),
        category: TemplateCategory::Distribution,
        content: "This agreement between Northwind Holdings and {{distributor_name}} \
                  ({{distributor_tax_id}}) grants distribution rights in {{territory}} \
                  with a credit limit of {{credit_limit}} EUR, effective {{effective_date}} \
                  until {{expiration_date}}. Version {{document_version}}."
            .to_string(),
        variables,
        revision: "1.0".to_string(),
        is_active: true,
        is_default: true,
        approval_required: true,
        approved_by: None,
        approved_at: None,
        auto_renewal: true,
        renewal_period_months: Some(12),
    })?;
    hub.terms.templates().approve(template.id, "legal@northwind.example")?;

    Ok(DemoSeed {
        distributor_id: distributor.id,
        agency_id: agency.id,
        product_id: product.id,
        template_id: template.id,
    })
}
